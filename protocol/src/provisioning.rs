//! Key provisioning.
//!
//! The validator network hands out the session's starting identity:
//! user name, balance, and a fresh keypair. This module only decodes that
//! bootstrap record; refresh and rotation are not part of the protocol.

use serde::Deserialize;
use std::fmt;

use crate::crypto::keys::{KeyError, WalletKeypair, WalletPublicKey};

/// One account record from the key-provisioning endpoint.
///
/// Has no `Serialize` impl and a redacting `Debug`, so the private key can
/// only leave this struct through [`ProvisionedAccount::private_key_pem`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionedAccount {
    pub user: String,
    pub balance: u64,
    #[serde(rename = "privKey")]
    private_key_pem: String,
    #[serde(rename = "pubKey")]
    pub public_key: String,
}

impl ProvisionedAccount {
    pub fn new(
        user: impl Into<String>,
        balance: u64,
        private_key_pem: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            balance,
            private_key_pem: private_key_pem.into(),
            public_key: public_key.into(),
        }
    }

    /// Generates a local account with a fresh keypair, for offline use and
    /// tests. The public key is recorded as hex.
    pub fn generate(user: impl Into<String>, balance: u64) -> Result<Self, KeyError> {
        let keypair = WalletKeypair::generate();
        Ok(Self::new(
            user,
            balance,
            keypair.to_pem()?,
            keypair.public_key().to_hex(),
        ))
    }

    /// PKCS#8 PEM private key.
    pub fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }

    /// Checks that the advertised public key belongs to the private key.
    pub fn check_keypair(&self) -> Result<(), KeyError> {
        let keypair = WalletKeypair::from_pem(&self.private_key_pem)?;
        let advertised = WalletPublicKey::parse(&self.public_key)?;
        if keypair.public_key() != advertised {
            return Err(KeyError::KeypairMismatch);
        }
        Ok(())
    }
}

impl fmt::Debug for ProvisionedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionedAccount")
            .field("user", &self.user)
            .field("balance", &self.balance)
            .field("public_key", &self.public_key)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Picks the account for `user`, or the first one when `user` is `None`.
pub fn select_account(
    accounts: Vec<ProvisionedAccount>,
    user: Option<&str>,
) -> Option<ProvisionedAccount> {
    match user {
        Some(name) => accounts.into_iter().find(|a| a.user == name),
        None => accounts.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_provisioning_payload() {
        let kp = WalletKeypair::from_seed(&[5u8; 32]);
        let body = serde_json::json!([{
            "user": "Alice",
            "balance": 100,
            "privKey": kp.to_pem().unwrap(),
            "pubKey": kp.public_key().to_pem().unwrap(),
        }]);
        let accounts: Vec<ProvisionedAccount> = serde_json::from_value(body).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].user, "Alice");
        assert_eq!(accounts[0].balance, 100);
        assert!(accounts[0].check_keypair().is_ok());
    }

    #[test]
    fn debug_redacts_private_key() {
        let account = ProvisionedAccount::generate("Bob", 10).unwrap();
        let debug = format!("{:?}", account);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    #[test]
    fn mismatched_public_key_is_detected() {
        let mut account = ProvisionedAccount::generate("Bob", 10).unwrap();
        account.public_key = WalletKeypair::generate().public_key().to_hex();
        assert_eq!(account.check_keypair(), Err(KeyError::KeypairMismatch));
    }

    #[test]
    fn select_by_name_or_first() {
        let accounts = vec![
            ProvisionedAccount::generate("Alice", 1).unwrap(),
            ProvisionedAccount::generate("Bob", 2).unwrap(),
        ];
        assert_eq!(
            select_account(accounts.clone(), Some("Bob")).unwrap().user,
            "Bob"
        );
        assert_eq!(select_account(accounts.clone(), None).unwrap().user, "Alice");
        assert!(select_account(accounts, Some("Zed")).is_none());
        assert!(select_account(vec![], None).is_none());
    }
}
