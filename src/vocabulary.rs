//! Closed dropdown vocabularies for the justification and loss-reason columns.

use chrono::NaiveDate;

/// Reasons an operator can give for a stalled shipment.
///
/// `Rescheduled` is the one entry whose label depends on the session date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Delivered,
    InRoute,
    AwaitingPickup,
    AddressNotFound,
    CustomerAbsent,
    ReturnedToSender,
    Lost,
    Damaged,
    Rescheduled,
}

impl Justification {
    pub const ALL: [Justification; 9] = [
        Justification::Delivered,
        Justification::InRoute,
        Justification::AwaitingPickup,
        Justification::AddressNotFound,
        Justification::CustomerAbsent,
        Justification::ReturnedToSender,
        Justification::Lost,
        Justification::Damaged,
        Justification::Rescheduled,
    ];

    /// Fixed label, `None` for the date-dependent entry.
    pub fn static_label(self) -> Option<&'static str> {
        match self {
            Justification::Delivered => Some("Entregue"),
            Justification::InRoute => Some("Em rota"),
            Justification::AwaitingPickup => Some("Aguardando retirada"),
            Justification::AddressNotFound => Some("Endereço não localizado"),
            Justification::CustomerAbsent => Some("Cliente ausente"),
            Justification::ReturnedToSender => Some("Devolvido ao remetente"),
            Justification::Lost => Some("Extraviado"),
            Justification::Damaged => Some("Avariado"),
            Justification::Rescheduled => None,
        }
    }
}

/// Why a shipment was written off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    Misplaced,
    Damaged,
    Theft,
    Accident,
    NotApplicable,
}

impl LossReason {
    pub const ALL: [LossReason; 5] = [
        LossReason::Misplaced,
        LossReason::Damaged,
        LossReason::Theft,
        LossReason::Accident,
        LossReason::NotApplicable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LossReason::Misplaced => "Extravio",
            LossReason::Damaged => "Avaria",
            LossReason::Theft => "Roubo",
            LossReason::Accident => "Sinistro",
            LossReason::NotApplicable => "Não se aplica",
        }
    }
}

/// Both vocabularies, with the dynamic label fixed for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    rescheduled_label: String,
}

impl Vocabulary {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            rescheduled_label: format!("Reagendado para {}", date.format("%d/%m/%Y")),
        }
    }

    pub fn label(&self, justification: Justification) -> &str {
        justification
            .static_label()
            .unwrap_or(self.rescheduled_label.as_str())
    }

    /// Justification labels in dropdown order.
    pub fn justifications(&self) -> Vec<&str> {
        Justification::ALL.iter().map(|j| self.label(*j)).collect()
    }

    pub fn loss_reasons(&self) -> Vec<&'static str> {
        LossReason::ALL.iter().map(|r| r.label()).collect()
    }

    pub fn parse_justification(&self, value: &str) -> Option<Justification> {
        Justification::ALL
            .into_iter()
            .find(|j| self.label(*j) == value)
    }

    pub fn parse_loss_reason(&self, value: &str) -> Option<LossReason> {
        LossReason::ALL.into_iter().find(|r| r.label() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::for_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn test_dynamic_label_uses_session_date() {
        let v = vocab();
        assert_eq!(v.label(Justification::Rescheduled), "Reagendado para 18/10/2026");
        assert_eq!(
            v.parse_justification("Reagendado para 18/10/2026"),
            Some(Justification::Rescheduled)
        );
    }

    #[test]
    fn test_vocabulary_is_closed() {
        let v = vocab();
        assert_eq!(v.parse_justification("Entregue"), Some(Justification::Delivered));
        assert_eq!(v.parse_justification("entregue"), None);
        assert_eq!(v.parse_justification("Reagendado para 17/10/2026"), None);
        assert_eq!(v.parse_loss_reason("Roubo"), Some(LossReason::Theft));
        assert_eq!(v.parse_loss_reason("Perdido"), None);
    }

    #[test]
    fn test_dropdown_order() {
        let v = vocab();
        let justifications = v.justifications();
        assert_eq!(justifications.len(), Justification::ALL.len());
        assert_eq!(justifications[0], "Entregue");
        assert_eq!(justifications.last().copied(), Some("Reagendado para 18/10/2026"));
        assert_eq!(v.loss_reasons()[4], "Não se aplica");
    }
}
