use modular_bitfield::bitfield;
use tracing::{debug, instrument, trace};
use zerocopy::{AsBytes, BigEndian, FromBytes, LayoutVerified, Unaligned, U16, U32};

use crate::{
    cose::CoseKey,
    error::{Error, Result},
};

pub const RP_ID_HASH_SIZE: usize = 32;

/// Largest credential id WebAuthn allows.
pub const MAX_CREDENTIAL_ID_LENGTH: usize = 1023;

/// rpIdHash, flags and signCount.
pub const HEADER_SIZE: usize = std::mem::size_of::<AuthenticatorDataHeader>();

#[repr(C)]
#[derive(FromBytes, AsBytes, Unaligned, Debug)]
struct AuthenticatorDataHeader {
    rp_id_hash: [u8; RP_ID_HASH_SIZE],
    flags: u8,
    sign_count: U32<BigEndian>,
}

#[repr(C)]
#[derive(FromBytes, AsBytes, Unaligned, Debug)]
struct AttestedCredentialDataHeader {
    aaguid: [u8; 16],
    credential_id_length: U16<BigEndian>,
}

#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// [See more](https://www.w3.org/TR/webauthn/#authenticator-data)
pub struct AuthenticatorDataFlags {
    pub user_present: bool,
    pub rfu_1: bool,
    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_state: bool,
    pub rfu_2: bool,
    pub attested_credential_data_included: bool,
    pub extension_data_included: bool,
}

impl AuthenticatorDataFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self::from_bytes([byte])
    }

    pub fn to_byte(self) -> u8 {
        self.into_bytes()[0]
    }
}

/// Identifies the authenticator model.
/// [See more](https://www.w3.org/TR/webauthn/#aaguid)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aaguid(pub [u8; 16]);

/// Identifies a credential.
/// [See more](https://w3c.github.io/webauthn/#credential-id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialId(pub Vec<u8>);

/// [See more](https://www.w3.org/TR/webauthn/#attested-credential-data)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: Aaguid,
    pub credential_id: CredentialId,
    pub credential_public_key: CoseKey,
}

impl AttestedCredentialData {
    fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        let (header, rest) =
            LayoutVerified::<_, AttestedCredentialDataHeader>::new_unaligned_from_prefix(bytes)
                .ok_or_else(|| {
                    Error::malformed(format!(
                        "attested credential data header needs {} bytes, {} left",
                        std::mem::size_of::<AttestedCredentialDataHeader>(),
                        bytes.len()
                    ))
                })?;
        let id_length = header.credential_id_length.get() as usize;
        if id_length > MAX_CREDENTIAL_ID_LENGTH {
            return Err(Error::malformed(format!(
                "credential id length {} exceeds {}",
                id_length, MAX_CREDENTIAL_ID_LENGTH
            )));
        }
        let credential_id = rest.get(..id_length).ok_or_else(|| {
            Error::malformed(format!(
                "credential id of {} bytes truncated to {}",
                id_length,
                rest.len()
            ))
        })?;
        let (credential_public_key, key_length) = CoseKey::decode(&rest[id_length..])?;

        let consumed = bytes.len() - rest.len() + id_length + key_length;
        Ok((
            AttestedCredentialData {
                aaguid: Aaguid(header.aaguid),
                credential_id: CredentialId(credential_id.to_vec()),
                credential_public_key,
            },
            consumed,
        ))
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let id = &self.credential_id.0;
        if id.len() > MAX_CREDENTIAL_ID_LENGTH {
            return Err(Error::malformed(format!(
                "credential id length {} exceeds {}",
                id.len(),
                MAX_CREDENTIAL_ID_LENGTH
            )));
        }
        let header = AttestedCredentialDataHeader {
            aaguid: self.aaguid.0,
            credential_id_length: U16::new(id.len() as u16),
        };
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(id);
        out.extend_from_slice(&self.credential_public_key.to_bytes()?);
        Ok(())
    }
}

/// The authenticator data an authenticator signs over.
///
/// In an attestation (after registration) `attested_credential_data` is set
/// and carries the credential's public key; in an assertion it is absent.
/// [See more](https://www.w3.org/TR/webauthn/#authenticator-data)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    pub rp_id_hash: [u8; RP_ID_HASH_SIZE],
    pub flags: AuthenticatorDataFlags,
    pub sign_count: u32,
    pub attested_credential_data: Option<AttestedCredentialData>,
    /// The raw extension bytes, not interpreted.
    pub extensions: Option<Vec<u8>>,
}

impl AuthenticatorData {
    /// Parses authenticator data from the start of `bytes`, returning it and the
    /// number of bytes it spans. With the extension flag set, everything after
    /// the attested credential data is the extension span. Without it, bytes
    /// after the structure are left for the caller.
    #[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        let (header, mut rest) =
            LayoutVerified::<_, AuthenticatorDataHeader>::new_unaligned_from_prefix(bytes)
                .ok_or_else(|| {
                    Error::malformed(format!(
                        "authenticator data is {} bytes, expected at least {}",
                        bytes.len(),
                        HEADER_SIZE
                    ))
                })?;
        let flags = AuthenticatorDataFlags::from_byte(header.flags);

        let attested_credential_data = if flags.attested_credential_data_included() {
            let (data, used) = AttestedCredentialData::parse(rest)?;
            rest = &rest[used..];
            Some(data)
        } else {
            None
        };

        // Extensions run to the end of the buffer and are kept opaque.
        let extensions = if flags.extension_data_included() {
            if rest.is_empty() {
                return Err(Error::malformed("extension data flagged but no bytes remain"));
            }
            let extensions = rest.to_vec();
            rest = &rest[rest.len()..];
            Some(extensions)
        } else {
            None
        };

        let consumed = bytes.len() - rest.len();
        if !rest.is_empty() {
            trace!(unconsumed = rest.len(), "Bytes left after authenticator data");
        }
        debug!(
            flags = flags.to_byte(),
            sign_count = header.sign_count.get(),
            consumed,
            "Parsed authenticator data"
        );
        Ok((
            AuthenticatorData {
                rp_id_hash: header.rp_id_hash,
                flags,
                sign_count: header.sign_count.get(),
                attested_credential_data,
                extensions,
            },
            consumed,
        ))
    }

    /// Like [`AuthenticatorData::parse`], but the structure must span all of
    /// `bytes`.
    pub fn parse_exact(bytes: &[u8]) -> Result<Self> {
        let (data, consumed) = Self::parse(bytes)?;
        if consumed != bytes.len() {
            return Err(Error::malformed(format!(
                "{} unconsumed bytes after authenticator data",
                bytes.len() - consumed
            )));
        }
        Ok(data)
    }

    /// Encodes the wire layout. The attested credential data and extension flags
    /// are derived from which optional parts are present.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut flags = self.flags;
        flags.set_attested_credential_data_included(self.attested_credential_data.is_some());
        flags.set_extension_data_included(self.extensions.is_some());
        let header = AuthenticatorDataHeader {
            rp_id_hash: self.rp_id_hash,
            flags: flags.to_byte(),
            sign_count: U32::new(self.sign_count),
        };

        let mut out = header.as_bytes().to_vec();
        if let Some(attested_credential_data) = &self.attested_credential_data {
            attested_credential_data.write(&mut out)?;
        }
        if let Some(extensions) = &self.extensions {
            out.extend_from_slice(extensions);
        }
        Ok(out)
    }
}
