use tracing::{debug, instrument, warn};

use crate::{
    codec,
    cose::CoseKey,
    crypto::{P256Verifier, RingP256Verifier},
    error::{Error, Result},
    verify::Verifier,
    webauthn::{signed_data, AuthenticatorData},
};

pub const DEFAULT_MAX_MESSAGE_LEN: usize = 64 * 1024;

/// Policy applied by [`AssertionVerifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Reject assertions without the UP flag.
    pub require_user_presence: bool,
    /// Reject assertions without the UV flag.
    pub require_user_verification: bool,
    /// Upper bound on the challenge and authenticator data sizes, which bound
    /// the scratch memory verification allocates.
    pub max_message_len: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            require_user_presence: true,
            require_user_verification: false,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

/// Verifies an assertion made by an enrolled credential.
#[derive(Debug, Clone, Default)]
pub struct AssertionVerifier<P = RingP256Verifier> {
    config: VerifierConfig,
    verifier: Verifier<P>,
}

impl AssertionVerifier<RingP256Verifier> {
    pub fn new(config: VerifierConfig) -> Self {
        AssertionVerifier {
            config,
            verifier: Verifier::default(),
        }
    }
}

impl<P: P256Verifier> AssertionVerifier<P> {
    pub fn with_p256_verifier(config: VerifierConfig, p256: P) -> Self {
        AssertionVerifier {
            config,
            verifier: Verifier::new(p256),
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    fn check_len(&self, what: &str, input: &[u8]) -> Result<()> {
        if input.len() > self.config.max_message_len {
            warn!(what, len = input.len(), "Input too large");
            return Err(Error::InputTooLarge {
                limit: self.config.max_message_len,
                actual: input.len(),
            });
        }
        Ok(())
    }

    /// Checks `signature` over `authenticator_data` and `challenge` against
    /// `key`. The authenticator data must parse completely and satisfy the
    /// configured user presence and verification policy; an assertion that
    /// fails the policy or the signature check yields `Ok(false)`.
    #[instrument(skip_all, fields(algorithm = ?key.algorithm()))]
    pub fn verify_assertion(
        &self,
        key: &CoseKey,
        challenge: &[u8],
        authenticator_data: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        self.check_len("challenge", challenge)?;
        self.check_len("authenticator data", authenticator_data)?;

        let parsed = AuthenticatorData::parse_exact(authenticator_data)?;
        let (signature, _) = codec::parse(key, signature)?;

        if self.config.require_user_presence && !parsed.flags.user_present() {
            warn!("Assertion lacks user presence");
            return Ok(false);
        }
        if self.config.require_user_verification && !parsed.flags.user_verified() {
            warn!("Assertion lacks user verification");
            return Ok(false);
        }

        let signed = signed_data(authenticator_data, challenge);
        let valid = self.verifier.verify(key, &signature, &signed)?;
        debug!(valid, sign_count = parsed.sign_count, "Checked assertion");
        Ok(valid)
    }
}
