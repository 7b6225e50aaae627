use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub(crate) const ACCOUNTS_FILE: &str = "accounts.json";
const MIN_PASSWORD_LEN: usize = 6;

/// The signed-in identity: the owner key plus the contact email stamped
/// into saved configs.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug)]
pub enum AccountError {
    EmailTaken,
    InvalidCredentials,
    WeakPassword,
    MissingField,
    Io(std::io::Error),
    Data(serde_json::Error),
    Hash(argon2::password_hash::Error),
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::EmailTaken => f.write_str("an account already exists for that email"),
            AccountError::InvalidCredentials => f.write_str("invalid email or password"),
            AccountError::WeakPassword => {
                write!(f, "password must be at least {MIN_PASSWORD_LEN} characters")
            }
            AccountError::MissingField => f.write_str("email and password are required"),
            AccountError::Io(err) => write!(f, "account registry io error: {err}"),
            AccountError::Data(err) => write!(f, "account registry data error: {err}"),
            AccountError::Hash(err) => write!(f, "password hash error: {err}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    user_id: String,
    email: String,
    password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// Email/password account registry persisted as a single JSON file under
/// the data root, keyed by normalized email. Mutations serialize behind a
/// lock and rewrite the file atomically.
#[derive(Clone)]
pub struct AccountRegistry {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl AccountRegistry {
    pub fn new(data_root: &Path) -> Self {
        Self {
            path: data_root.join(ACCOUNTS_FILE),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AccountError> {
        let email = normalize_email(email).ok_or(AccountError::MissingField)?;
        if password.is_empty() {
            return Err(AccountError::MissingField);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }

        let _guard = self.lock.lock().expect("account registry lock");
        let mut records = self.load()?;
        if records.contains_key(&email) {
            return Err(AccountError::EmailTaken);
        }

        let record = AccountRecord {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash: hash_password(password)?,
            created_at: OffsetDateTime::now_utc(),
        };
        let identity = Identity {
            user_id: record.user_id.clone(),
            email: record.email.clone(),
        };
        records.insert(email, record);
        self.save(&records)?;
        Ok(identity)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AccountError> {
        let email = normalize_email(email).ok_or(AccountError::MissingField)?;
        if password.is_empty() {
            return Err(AccountError::MissingField);
        }

        let records = {
            let _guard = self.lock.lock().expect("account registry lock");
            self.load()?
        };
        let record = records.get(&email).ok_or(AccountError::InvalidCredentials)?;
        if !verify_password(password, &record.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(Identity {
            user_id: record.user_id.clone(),
            email: record.email.clone(),
        })
    }

    fn load(&self) -> Result<BTreeMap<String, AccountRecord>, AccountError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(AccountError::Io(err)),
        };
        serde_json::from_str(&contents).map_err(AccountError::Data)
    }

    fn save(&self, records: &BTreeMap<String, AccountRecord>) -> Result<(), AccountError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(AccountError::Io)?;
        }
        let encoded = serde_json::to_string_pretty(records).map_err(AccountError::Data)?;
        crate::store::atomic_write(&self.path, encoded.as_bytes()).map_err(AccountError::Io)
    }
}

fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AccountError::Hash)
}

pub(crate) fn verify_password(password: &str, password_hash: &str) -> bool {
    let hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}
