//! MLCC: a Multi-Layer Custom Cipher and its classical cryptanalysis toolkit.
//!
//! A message passes through three reversible layers, each keyed by one part
//! of a [`CompositeKey`]: a monoalphabetic substitution, a Vigenere shift
//! adjusted by a positional modifier, and a multi-directional columnar
//! transposition. Decryption inverts the layers in reverse order.
//!
//! The [`analysis`] module attacks single layers from ciphertext alone and
//! returns ranked candidates.
//!
//! # Architecture
//!
//! ```text
//! Alphabet        (ordered symbol set, O(1) lookups)
//!     ↓
//! CompositeKey    (SubstitutionKey + VigenereKey + TranspositionKey)
//!     ↓
//! Pipeline        substitution_codec → vigenere_codec → transposition_codec
//!
//! analysis        frequency · substitution · Vigenere · transposition attacks
//! ```
//!
//! # Examples
//!
//! Encrypt and decrypt with a generated key:
//!
//! ```
//! use mlcc::{decrypt, encrypt, generate_key, KeyParams};
//!
//! let key = generate_key(&KeyParams::default()).unwrap();
//! let ciphertext = encrypt("meet me at the old bridge", &key).unwrap();
//! assert_eq!(decrypt(&ciphertext, &key).unwrap(), "meet me at the old bridge");
//! ```
//!
//! Keys travel as a single line of text:
//!
//! ```
//! use mlcc::CompositeKey;
//!
//! let text = "mlcc1;alphabet=abcdefghijklmnopqrstuvwxyz;sub=defghijklmnopqrstuvwxyzabc;\
//!             vig=key;mod=cyclic:2;width=4;dirs=LR";
//! let key = CompositeKey::parse(text).unwrap();
//! assert_eq!(key.serialize(), text);
//! assert_eq!(mlcc::encrypt("attackatdawn", &key).unwrap(), "nbuojmnbeodp");
//! ```

#![deny(clippy::all)]

pub mod alphabet;
pub mod analysis;
pub mod error;
pub mod key;
pub mod pipeline;
pub mod substitution_codec;
pub mod transposition_codec;
pub mod vigenere_codec;

pub(crate) mod utils;

pub use alphabet::Alphabet;
pub use analysis::{
    analyze_frequency, brute_force_transposition, crack_substitution, crack_vigenere,
    recover_vigenere_key, AnalysisConfig, FrequencyReport, SubstitutionCandidate,
    SubstitutionConfig, TranspositionCandidate, TranspositionConfig, VigenereCandidate,
    VigenereConfig,
};
pub use error::{MlccError, Result};
pub use key::{
    generate_key, generate_key_with_rng, CompositeKey, Direction, KeyParams, Layer,
    PositionalModifier, SubstitutionKey, TranspositionKey, VigenereKey, KEY_FORMAT_VERSION,
};
pub use pipeline::{decrypt, encrypt, EncryptionTrace, Pipeline};
