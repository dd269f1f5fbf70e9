//! Serde models for Quovo API response bodies.
//!
//! Each `*Body` struct mirrors the JSON nesting of one endpoint's
//! response, so envelopes can be decoded straight into the field the
//! walkthrough needs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An issued API Access Token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque bearer credential
    pub token: String,

    /// Human-assigned token name
    pub name: Option<String>,
}

/// Body wrapper for token issuance responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBody {
    pub access_token: AccessToken,
}

/// A Quovo User, the owner of synced Accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned id
    pub id: u64,

    /// Caller-supplied username
    pub username: Option<String>,
}

/// Body wrapper for user creation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBody {
    pub user: User,
}

/// An Account: one institution login belonging to a User.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Server-assigned id
    pub id: u64,
}

/// Body wrapper for account creation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBody {
    pub account: Account,
}

/// Sync states reported by the status endpoint. Anything other than
/// `Syncing` is terminal; only `Good` is a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SyncStatus {
    Syncing,
    Good,
    Other(String),
}

impl From<String> for SyncStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "syncing" => SyncStatus::Syncing,
            "good" => SyncStatus::Good,
            _ => SyncStatus::Other(raw),
        }
    }
}

impl From<SyncStatus> for String {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::Syncing => "syncing".to_string(),
            SyncStatus::Good => "good".to_string(),
            SyncStatus::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Good => write!(f, "good"),
            SyncStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Progress detail reported while a sync is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncProgress {
    /// Human-readable description of the current sync stage
    pub message: Option<String>,

    /// Completed fraction, 0..1
    pub percent: Option<f64>,
}

/// The mutable sync record the server keeps on an Account. The client
/// only ever observes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    pub status: SyncStatus,
    pub progress: Option<SyncProgress>,
}

/// Body wrapper for sync status responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncBody {
    pub sync: SyncRecord,
}

/// A Portfolio: a subaccount found within an institution login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    /// Server-assigned id
    pub id: u64,

    pub portfolio_name: Option<String>,
}

/// Body wrapper for portfolio listing responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfoliosBody {
    pub portfolios: Vec<Portfolio>,
}

/// A holding within a Portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub ticker: Option<String>,

    /// Security class, e.g. "Equity"
    pub security_type: Option<String>,

    pub quantity: Option<Decimal>,

    pub price: Option<Decimal>,

    /// Name of the owning Portfolio
    pub portfolio_name: Option<String>,

    /// Id of the owning Account
    pub account: Option<u64>,
}

impl Position {
    /// Whether this holding is an equity position.
    pub fn is_equity(&self) -> bool {
        self.security_type.as_deref() == Some("Equity")
    }
}

/// Body wrapper for position listing responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsBody {
    pub positions: Vec<Position>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn sync_status_maps_known_and_unknown_strings() {
        assert_eq!(SyncStatus::from("syncing".to_string()), SyncStatus::Syncing);
        assert_eq!(SyncStatus::from("good".to_string()), SyncStatus::Good);
        assert_eq!(
            SyncStatus::from("bad credentials".to_string()),
            SyncStatus::Other("bad credentials".to_string())
        );
    }

    #[test]
    fn sync_body_decodes_status_and_progress() {
        let body: SyncBody = serde_json::from_value(json!({
            "sync": {
                "status": "syncing",
                "progress": { "message": "fetching holdings", "percent": 0.25 }
            }
        }))
        .unwrap();
        assert_eq!(body.sync.status, SyncStatus::Syncing);
        let progress = body.sync.progress.unwrap();
        assert_eq!(progress.message.as_deref(), Some("fetching holdings"));
        assert_eq!(progress.percent, Some(0.25));
    }

    #[test]
    fn terminal_status_without_progress_decodes() {
        let body: SyncBody =
            serde_json::from_value(json!({ "sync": { "status": "good" } })).unwrap();
        assert_eq!(body.sync.status, SyncStatus::Good);
        assert!(body.sync.progress.is_none());
    }

    #[test]
    fn position_quantities_are_decimals() {
        let body: PositionsBody = serde_json::from_value(json!({
            "positions": [{
                "ticker": "AAPL",
                "security_type": "Equity",
                "quantity": 10.5,
                "price": 187.32,
                "portfolio_name": "Test Portfolio",
                "account": 99
            }]
        }))
        .unwrap();
        let position = &body.positions[0];
        assert_eq!(position.quantity, Some(dec!(10.5)));
        assert_eq!(position.price, Some(dec!(187.32)));
        assert!(position.is_equity());
    }

    #[test]
    fn non_equity_positions_are_filtered_out() {
        let bond = Position {
            ticker: Some("T-BILL".to_string()),
            security_type: Some("Fixed Income".to_string()),
            quantity: None,
            price: None,
            portfolio_name: None,
            account: None,
        };
        assert!(!bond.is_equity());
    }
}
