use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{event, Level};

use skauth::{
    assertion::DEFAULT_MAX_MESSAGE_LEN, AssertionVerifier, AuthenticatorData, CoseKey,
    VerifierConfig,
};

#[derive(Debug, Parser)]
#[command(name = "skauth")]
#[command(about = "Inspect and verify FIDO2 security key signatures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the parsed structure of authenticator data
    Inspect {
        /// Authenticator data, hex encoded
        #[arg(long)]
        auth_data: String,
    },
    /// Verify an assertion signature against a COSE public key
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
struct VerifyArgs {
    /// COSE_Key of the credential, hex encoded
    #[arg(long)]
    key: String,

    /// Authenticator data, hex encoded
    #[arg(long)]
    auth_data: String,

    /// Challenge, hex encoded
    #[arg(long, required_unless_present = "challenge_text", conflicts_with = "challenge_text")]
    challenge: Option<String>,

    /// Challenge, as UTF-8 text
    #[arg(long)]
    challenge_text: Option<String>,

    /// Signature in its wire format, hex encoded
    #[arg(long)]
    signature: String,

    /// Require the user verified flag
    #[arg(long)]
    require_uv: bool,

    /// Accept assertions without the user present flag
    #[arg(long)]
    no_require_up: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_LEN)]
    max_message_len: usize,
}

impl VerifyArgs {
    fn config(&self) -> VerifierConfig {
        VerifierConfig {
            require_user_presence: !self.no_require_up,
            require_user_verification: self.require_uv,
            max_message_len: self.max_message_len,
        }
    }
}

fn decode_hex(what: &str, input: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(input.trim()).with_context(|| format!("{} is not valid hex", what))
}

fn inspect(auth_data: &str) -> anyhow::Result<()> {
    let bytes = decode_hex("authenticator data", auth_data)?;
    let (data, consumed) =
        AuthenticatorData::parse(&bytes).context("Failed to parse authenticator data")?;

    println!("rpIdHash:  {}", hex::encode(data.rp_id_hash));
    println!(
        "flags:     {:#04x} (UP={} UV={} BE={} BS={} AT={} ED={})",
        data.flags.to_byte(),
        data.flags.user_present() as u8,
        data.flags.user_verified() as u8,
        data.flags.backup_eligible() as u8,
        data.flags.backup_state() as u8,
        data.flags.attested_credential_data_included() as u8,
        data.flags.extension_data_included() as u8,
    );
    println!("signCount: {}", data.sign_count);
    if let Some(acd) = &data.attested_credential_data {
        println!("aaguid:    {}", hex::encode(acd.aaguid.0));
        println!("credId:    {}", hex::encode(&acd.credential_id.0));
        println!("key:       {:?}", acd.credential_public_key);
        println!(
            "coseKey:   {}",
            hex::encode(acd.credential_public_key.to_bytes()?)
        );
    }
    if let Some(extensions) = &data.extensions {
        println!("extensions: {}", hex::encode(extensions));
    }
    if consumed < bytes.len() {
        println!("unconsumed: {} bytes", bytes.len() - consumed);
    }
    Ok(())
}

fn verify(args: &VerifyArgs) -> anyhow::Result<bool> {
    let key_bytes = decode_hex("key", &args.key)?;
    let (key, consumed) = CoseKey::decode(&key_bytes).context("Failed to decode COSE key")?;
    if consumed != key_bytes.len() {
        anyhow::bail!("{} trailing bytes after COSE key", key_bytes.len() - consumed);
    }
    let auth_data = decode_hex("authenticator data", &args.auth_data)?;
    let challenge = match (&args.challenge, &args.challenge_text) {
        (Some(challenge), _) => decode_hex("challenge", challenge)?,
        (None, Some(text)) => text.as_bytes().to_vec(),
        (None, None) => anyhow::bail!("either --challenge or --challenge-text is required"),
    };
    let signature = decode_hex("signature", &args.signature)?;

    let verifier = AssertionVerifier::new(args.config());
    let valid = verifier
        .verify_assertion(&key, &challenge, &auth_data, &signature)
        .context("Failed to verify assertion")?;
    Ok(valid)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { auth_data } => {
            inspect(&auth_data)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify(args) => {
            if verify(&args)? {
                event!(Level::INFO, "Signature verified");
                println!("OK");
                Ok(ExitCode::SUCCESS)
            } else {
                event!(Level::WARN, "Signature did not verify");
                println!("FAILED");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
