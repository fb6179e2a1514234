//! Pre-trial investigation economy.
//!
//! Clue purchases spend a currency balance to discover evidence before
//! the trial opens. A purchase is atomic: the funds check, the balance
//! deduction, the purchased flag and the evidence reveal all happen
//! together or not at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::case::{Case, Clue};

/// Rejections of a clue purchase. None of them changes any state.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvestigationError {
    #[error("unknown clue: {0}")]
    UnknownClue(String),

    #[error("clue {0} was already purchased")]
    AlreadyPurchased(String),

    #[error("insufficient funds: clue costs {price}, balance is {balance}")]
    InsufficientFunds { price: u32, balance: u32 },
}

/// Record of one completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub clue_id: String,
    pub evidence_id: String,
    pub price: u32,
    pub remaining_balance: u32,
}

/// The player's investigation funds for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investigation {
    balance: u32,
}

impl Investigation {
    pub fn new(balance: u32) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    /// Clues still on offer, regardless of affordability.
    pub fn available_clues<'a>(&self, case: &'a Case) -> Vec<&'a Clue> {
        case.clues.iter().filter(|c| !c.purchased).collect()
    }

    /// Buy a clue, discovering the evidence it points at.
    ///
    /// All checks run before any mutation; a rejected purchase leaves the
    /// balance, the clue and the evidence untouched. Purchasing is
    /// per-clue at most once.
    pub fn purchase_clue(
        &mut self,
        case: &mut Case,
        clue_id: &str,
    ) -> Result<PurchaseReceipt, InvestigationError> {
        let index = case
            .clues
            .iter()
            .position(|c| c.id == clue_id)
            .ok_or_else(|| InvestigationError::UnknownClue(clue_id.to_string()))?;
        let clue = &case.clues[index];
        if clue.purchased {
            return Err(InvestigationError::AlreadyPurchased(clue_id.to_string()));
        }
        if clue.price > self.balance {
            return Err(InvestigationError::InsufficientFunds {
                price: clue.price,
                balance: self.balance,
            });
        }
        let price = clue.price;
        let evidence_id = clue.evidence_id.clone();

        self.balance -= price;
        case.clues[index].purchased = true;
        // Case validation guarantees the evidence reference resolves.
        if let Some(evidence) = case.evidence_mut(&evidence_id) {
            evidence.reveal();
        }

        tracing::info!(
            clue_id = %clue_id,
            evidence_id = %evidence_id,
            price,
            remaining = self.balance,
            "Clue purchased"
        );
        Ok(PurchaseReceipt {
            clue_id: clue_id.to_string(),
            evidence_id,
            price,
            remaining_balance: self.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_case;

    #[test]
    fn test_purchase_discovers_evidence_and_deducts() {
        let mut case = sample_case();
        let mut investigation = Investigation::new(100);

        let receipt = investigation.purchase_clue(&mut case, "clue_keycard").unwrap();
        assert_eq!(receipt.price, 60);
        assert_eq!(receipt.evidence_id, "ev_keycard");
        assert_eq!(receipt.remaining_balance, 40);
        assert_eq!(investigation.balance(), 40);
        assert!(case.evidence("ev_keycard").unwrap().discovered);
        assert!(case.clues[0].purchased);
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let mut case = sample_case();
        let mut investigation = Investigation::new(50);

        let result = investigation.purchase_clue(&mut case, "clue_keycard");
        assert_eq!(
            result,
            Err(InvestigationError::InsufficientFunds {
                price: 60,
                balance: 50,
            })
        );
        assert_eq!(investigation.balance(), 50);
        assert!(!case.clues[0].purchased);
        assert!(!case.evidence("ev_keycard").unwrap().discovered);
    }

    #[test]
    fn test_repurchase_rejected() {
        let mut case = sample_case();
        let mut investigation = Investigation::new(200);

        investigation.purchase_clue(&mut case, "clue_keycard").unwrap();
        let result = investigation.purchase_clue(&mut case, "clue_keycard");
        assert_eq!(
            result,
            Err(InvestigationError::AlreadyPurchased(
                "clue_keycard".to_string()
            ))
        );
        // The failed attempt cost nothing.
        assert_eq!(investigation.balance(), 140);
    }

    #[test]
    fn test_unknown_clue_rejected() {
        let mut case = sample_case();
        let mut investigation = Investigation::new(100);
        let result = investigation.purchase_clue(&mut case, "clue_invented");
        assert_eq!(
            result,
            Err(InvestigationError::UnknownClue("clue_invented".to_string()))
        );
        assert_eq!(investigation.balance(), 100);
    }

    #[test]
    fn test_available_clues_shrinks_after_purchase() {
        let mut case = sample_case();
        let mut investigation = Investigation::new(100);
        assert_eq!(investigation.available_clues(&case).len(), 1);

        investigation.purchase_clue(&mut case, "clue_keycard").unwrap();
        assert!(investigation.available_clues(&case).is_empty());
    }
}
