//! Tracking number generation.
//!
//! A tracking number is exactly 16 characters from `[A-Z0-9]`. The primary scheme
//! composes it from fixed-width fields:
//!
//! ```text
//! US IN 55 K3QZ 15O 7XA
//! │  │  │  │    │   └── padding: random, fills up to 16
//! │  │  │  │    └────── weight: trunc(weight * 1000) in base 36
//! │  │  │  └─────────── random: 4 characters
//! │  │  └────────────── customer: first 2 hex digits of the customer UUID
//! │  └───────────────── destination: first 2 characters
//! └──────────────────── origin: first 2 characters
//! ```
//!
//! After a collision the service switches to [`TrackingCodeGenerator::regenerate`], which
//! keeps the origin and destination fields and fills the remainder with random characters.
//!
//! Randomness comes from the [`RngCore`] handed to the generator, so tests can pin it.

use std::sync::{LazyLock, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::domain::entities::Shipment;

/// Length of every tracking number.
pub const TRACKING_NUMBER_LENGTH: usize = 16;

/// Alphabet for random fields.
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Digit order for base 36.
const BASE36_DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const COUNTRY_FIELD_LENGTH: usize = 2;
const CUSTOMER_HASH_LENGTH: usize = 2;
const RANDOM_PART_LENGTH: usize = 4;
const WEIGHT_MULTIPLIER: i64 = 1000;

static TRACKING_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{16}$").expect("tracking number regex is valid"));

/// Failure to compose a valid tracking number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The deterministic fields alone are longer than a tracking number.
    #[error("Generated components exceed 16 characters (got {length})")]
    ComponentOverflow { length: usize },

    /// The weight is negative or too large to encode.
    #[error("Weight {weight} cannot be encoded into a tracking number")]
    WeightOutOfRange { weight: Decimal },

    /// The composed code failed the final format check.
    #[error("Generated tracking number '{code}' is invalid")]
    MalformedCode { code: String },
}

/// Returns `true` if `code` is a well-formed tracking number.
pub fn is_valid_tracking_number(code: &str) -> bool {
    TRACKING_NUMBER_REGEX.is_match(code)
}

/// Generates candidate tracking numbers.
///
/// Holds no state apart from its random source. The mutex is only taken for the
/// duration of a single generation, never across an `.await`.
pub struct TrackingCodeGenerator {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl TrackingCodeGenerator {
    /// Creates a generator drawing from the given random source.
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Creates a generator backed by a CSPRNG seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Creates a generator with a fixed seed. Output is reproducible across runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Composes a candidate using the primary scheme.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::WeightOutOfRange`] for negative or oversized weights
    /// - [`GenerationError::ComponentOverflow`] if the fixed fields exceed 16 characters
    /// - [`GenerationError::MalformedCode`] if the result is not `[A-Z0-9]{16}`
    pub fn generate(&self, shipment: &Shipment) -> Result<String, GenerationError> {
        let origin = country_field(&shipment.origin_country_id);
        let destination = country_field(&shipment.destination_country_id);
        let customer = customer_field(shipment.customer_id);
        let weight = weight_field(shipment.weight)?;

        let fixed_length =
            origin.len() + destination.len() + customer.len() + RANDOM_PART_LENGTH + weight.len();
        if fixed_length > TRACKING_NUMBER_LENGTH {
            return Err(GenerationError::ComponentOverflow {
                length: fixed_length,
            });
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let random = random_alphanumeric(&mut *rng, RANDOM_PART_LENGTH);
        let padding = random_alphanumeric(&mut *rng, TRACKING_NUMBER_LENGTH - fixed_length);
        drop(rng);

        finalize(format!(
            "{origin}{destination}{customer}{random}{weight}{padding}"
        ))
    }

    /// Composes a candidate using the fallback scheme: origin and destination
    /// fields followed by random characters.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MalformedCode`] if the country codes contain
    /// characters outside `[A-Za-z0-9]`.
    pub fn regenerate(&self, origin: &str, destination: &str) -> Result<String, GenerationError> {
        let origin = country_field(origin);
        let destination = country_field(destination);
        let remaining = TRACKING_NUMBER_LENGTH - origin.len() - destination.len();

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let random = random_alphanumeric(&mut *rng, remaining);
        drop(rng);

        finalize(format!("{origin}{destination}{random}"))
    }
}

impl Default for TrackingCodeGenerator {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

fn country_field(code: &str) -> String {
    code.chars()
        .take(COUNTRY_FIELD_LENGTH)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn customer_field(customer_id: Uuid) -> String {
    let mut buf = Uuid::encode_buffer();
    let hex = customer_id.simple().encode_upper(&mut buf);
    hex[..CUSTOMER_HASH_LENGTH].to_string()
}

fn weight_field(weight: Decimal) -> Result<String, GenerationError> {
    weight
        .checked_mul(Decimal::from(WEIGHT_MULTIPLIER))
        .and_then(|scaled| scaled.trunc().to_u64())
        .map(to_base36)
        .ok_or(GenerationError::WeightOutOfRange { weight })
}

/// Encodes `n` in upper-case base 36. Zero encodes to `"0"`.
fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }

    digits.iter().rev().collect()
}

fn random_alphanumeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}

fn finalize(code: String) -> Result<String, GenerationError> {
    if is_valid_tracking_number(&code) {
        Ok(code)
    } else {
        tracing::error!(code = %code, "Generated tracking number failed format check");
        Err(GenerationError::MalformedCode { code })
    }
}
