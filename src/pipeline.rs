//! Pipeline: the three layers composed into the MLCC cipher.
//!
//! Encryption runs substitution, then Vigenere, then transposition, as
//! listed by [`CompositeKey::layer_order`]. Decryption runs the inverse
//! layers in reverse order. A failing layer aborts the whole operation; no
//! partially processed text is ever returned.

use serde::Serialize;

use crate::alphabet::Alphabet;
use crate::error::{MlccError, Result};
use crate::key::{CompositeKey, Layer};
use crate::{substitution_codec, transposition_codec, vigenere_codec};

/// Every intermediate stage of one encryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptionTrace {
    /// Output of the substitution layer.
    pub substituted: String,
    /// Output of the Vigenere layer (input of the transposition layer).
    pub vigenere: String,
    /// Final ciphertext.
    pub ciphertext: String,
}

/// Encrypts and decrypts with one [`CompositeKey`].
///
/// Holds no state besides the borrowed key, so one pipeline can serve any
/// number of independent messages.
///
/// # Examples
///
/// ```
/// use mlcc::{CompositeKey, Pipeline};
///
/// let key: CompositeKey = "mlcc1;alphabet=abcdefghijklmnopqrstuvwxyz;\
///     sub=defghijklmnopqrstuvwxyzabc;vig=key;mod=cyclic:2;width=4;dirs=LR"
///     .parse()
///     .unwrap();
/// let pipeline = Pipeline::new(&key);
///
/// let ciphertext = pipeline.encrypt("attackatdawn").unwrap();
/// assert_eq!(ciphertext, "nbuojmnbeodp");
/// assert_eq!(pipeline.decrypt(&ciphertext).unwrap(), "attackatdawn");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'k> {
    key: &'k CompositeKey,
}

impl<'k> Pipeline<'k> {
    pub fn new(key: &'k CompositeKey) -> Self {
        Pipeline { key }
    }

    pub fn key(&self) -> &'k CompositeKey {
        self.key
    }

    /// Encrypts `plaintext` through all three layers.
    ///
    /// # Errors
    /// Surfaces the first layer failure unchanged.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.key
            .layer_order()
            .iter()
            .try_fold(plaintext.to_string(), |text, &layer| self.encode_layer(layer, &text))
    }

    /// Encrypts `plaintext` and keeps every intermediate stage.
    ///
    /// # Errors
    /// Surfaces the first layer failure unchanged.
    pub fn encrypt_traced(&self, plaintext: &str) -> Result<EncryptionTrace> {
        let substituted = self.encode_layer(Layer::Substitution, plaintext)?;
        let vigenere = self.encode_layer(Layer::Vigenere, &substituted)?;
        let ciphertext = self.encode_layer(Layer::Transposition, &vigenere)?;
        Ok(EncryptionTrace {
            substituted,
            vigenere,
            ciphertext,
        })
    }

    /// Decrypts `ciphertext` by inverting the layers in reverse order.
    ///
    /// Every string is a valid ciphertext: each layer is a bijection on
    /// strings, so tampered text decrypts to some other plaintext rather
    /// than failing.
    ///
    /// # Errors
    /// Surfaces the first layer failure unchanged, and returns
    /// [`MlccError::DecryptionError`] if the layers changed the length or
    /// the number of alphabet symbols. No input triggers that; it flags a
    /// faulty layer.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let plaintext = self
            .key
            .layer_order()
            .iter()
            .rev()
            .try_fold(ciphertext.to_string(), |text, &layer| self.decode_layer(layer, &text))?;
        check_consistency(self.key.alphabet(), ciphertext, &plaintext)?;
        Ok(plaintext)
    }

    fn encode_layer(&self, layer: Layer, text: &str) -> Result<String> {
        match layer {
            Layer::Substitution => Ok(substitution_codec::encode(text, self.key.substitution())),
            Layer::Vigenere => Ok(vigenere_codec::encode(text, self.key.vigenere())),
            Layer::Transposition => transposition_codec::encode(text, self.key.transposition()),
        }
    }

    fn decode_layer(&self, layer: Layer, text: &str) -> Result<String> {
        match layer {
            Layer::Substitution => Ok(substitution_codec::decode(text, self.key.substitution())),
            Layer::Vigenere => Ok(vigenere_codec::decode(text, self.key.vigenere())),
            Layer::Transposition => transposition_codec::decode(text, self.key.transposition()),
        }
    }
}

/// Asserts the invariant every layer keeps: the output has the length and
/// the number of `alphabet` symbols of the input.
///
/// # Errors
/// [`MlccError::DecryptionError`] naming the broken half of the invariant.
fn check_consistency(alphabet: &Alphabet, ciphertext: &str, plaintext: &str) -> Result<()> {
    let (cipher_len, plain_len) = (ciphertext.chars().count(), plaintext.chars().count());
    if cipher_len != plain_len {
        return Err(MlccError::DecryptionError(format!(
            "decoded {} symbols from {} ciphertext symbols",
            plain_len, cipher_len
        )));
    }
    let (cipher_symbols, plain_symbols) =
        (alphabet.count_symbols(ciphertext), alphabet.count_symbols(plaintext));
    if cipher_symbols != plain_symbols {
        return Err(MlccError::DecryptionError(format!(
            "decoded text holds {} alphabet symbols, ciphertext holds {}",
            plain_symbols, cipher_symbols
        )));
    }
    Ok(())
}

/// Encrypts `plaintext` with `key`. See [`Pipeline::encrypt`].
///
/// # Errors
/// Surfaces the first layer failure unchanged.
pub fn encrypt(plaintext: &str, key: &CompositeKey) -> Result<String> {
    Pipeline::new(key).encrypt(plaintext)
}

/// Decrypts `ciphertext` with `key`. See [`Pipeline::decrypt`].
///
/// # Errors
/// Layer failures, or [`MlccError::DecryptionError`] on a failed
/// consistency check.
pub fn decrypt(ciphertext: &str, key: &CompositeKey) -> Result<String> {
    Pipeline::new(key).decrypt(ciphertext)
}
