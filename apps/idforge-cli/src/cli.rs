//! Command-line surface and its mapping onto [`Request`].

use clap::{Args, Parser, Subcommand};

use idforge_core::card::{BrandSelection, ExpiryFormat, ExpiryKind, ExpiryPolicy};
use idforge_core::cnpj::{BranchMode, CnpjOptions};
use idforge_core::cpf::CpfOptions;
use idforge_core::dispatch::{CardRequest, DocumentRequest};
use idforge_core::{MaskMode, Request};

use crate::config::CliConfig;

/// Generate and validate CPF, CNPJ and payment card numbers.
///
/// Every command prints a JSON report on stdout. Logs go to stderr; set
/// `RUST_LOG` or pass `-v` for more.
#[derive(Parser, Debug)]
#[command(name = "idforge", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pretty-print the JSON report.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Individual taxpayer IDs (11 digits).
    #[command(subcommand)]
    Cpf(CpfCommand),

    /// Legal-entity taxpayer IDs (14 digits).
    #[command(subcommand)]
    Cnpj(CnpjCommand),

    /// Payment card numbers.
    #[command(subcommand)]
    Card(CardCommand),

    /// Answer a JSON request given inline or on stdin.
    Request {
        /// The request document; read from stdin when omitted.
        json: Option<String>,
    },
}

// =============================================================================
// Shared Arguments
// =============================================================================

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Identifiers to process; separators are ignored.
    #[arg(required = true)]
    pub inputs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Print bare digits instead of the punctuated form.
    #[arg(long)]
    pub unmasked: bool,
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// How many identifiers to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Print bare digits instead of the punctuated form.
    #[arg(long)]
    pub unmasked: bool,
}

impl CountArgs {
    fn mask(&self) -> MaskMode {
        MaskMode::from_flag(!self.unmasked)
    }
}

// =============================================================================
// CPF / CNPJ
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CpfCommand {
    /// Check length, repeated digits and both check digits.
    Validate(InputArgs),
    /// Render as 000.000.000-00 or bare digits.
    Format(FormatArgs),
    /// Report the fiscal region that issued each CPF.
    Identify(InputArgs),
    /// Generate valid CPFs.
    Generate {
        #[command(flatten)]
        count: CountArgs,

        /// Force the fiscal region digit (0-9).
        #[arg(long)]
        region: Option<u8>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CnpjCommand {
    /// Check length, repeated digits and both check digits.
    Validate(InputArgs),
    /// Render as 00.000.000/0000-00 or bare digits.
    Format(FormatArgs),
    /// Report root, branch and headquarters flag.
    Identify(InputArgs),
    /// Generate valid CNPJs.
    Generate {
        #[command(flatten)]
        count: CountArgs,

        /// Draw a random branch number instead of 0001.
        #[arg(long)]
        random_branch: bool,
    },
}

impl CpfCommand {
    pub fn into_request(self) -> DocumentRequest<CpfOptions> {
        match self {
            CpfCommand::Validate(args) => DocumentRequest::Validate {
                inputs: args.inputs,
            },
            CpfCommand::Format(args) => DocumentRequest::Format {
                mask: MaskMode::from_flag(!args.unmasked),
                inputs: args.inputs,
            },
            CpfCommand::Identify(args) => DocumentRequest::Identify {
                inputs: args.inputs,
            },
            CpfCommand::Generate { count, region } => DocumentRequest::Generate {
                options: CpfOptions {
                    region,
                    mask: count.mask(),
                },
                count: count.count,
            },
        }
    }
}

impl CnpjCommand {
    pub fn into_request(self) -> DocumentRequest<CnpjOptions> {
        match self {
            CnpjCommand::Validate(args) => DocumentRequest::Validate {
                inputs: args.inputs,
            },
            CnpjCommand::Format(args) => DocumentRequest::Format {
                mask: MaskMode::from_flag(!args.unmasked),
                inputs: args.inputs,
            },
            CnpjCommand::Identify(args) => DocumentRequest::Identify {
                inputs: args.inputs,
            },
            CnpjCommand::Generate {
                count,
                random_branch,
            } => DocumentRequest::Generate {
                options: CnpjOptions {
                    branch: if random_branch {
                        BranchMode::Random
                    } else {
                        BranchMode::Headquarters
                    },
                    mask: count.mask(),
                },
                count: count.count,
            },
        }
    }
}

// =============================================================================
// Cards
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CardCommand {
    /// Check length, Luhn checksum and brand.
    Validate(InputArgs),
    /// Render with the brand's grouping or as bare digits.
    Format(FormatArgs),
    /// Report the brand of each number.
    Identify(InputArgs),
    /// Generate Luhn-valid numbers.
    Generate(CardGenerateArgs),
    /// Check expiry dates (MM/YY, MM/YYYY or YYYY-MM) against today.
    Expiry(InputArgs),
}

#[derive(Args, Debug)]
pub struct CardGenerateArgs {
    #[command(flatten)]
    pub count: CountArgs,

    /// Brand name, or "any" for a random brand per card.
    #[arg(short, long, default_value = "any")]
    pub brand: BrandSelection,

    /// Attach a CVV of the brand's length.
    #[arg(long)]
    pub cvv: bool,

    /// Attach an expiry date: future, past or mixed.
    #[arg(long)]
    pub expiry: Option<ExpiryKind>,

    /// Layout of the attached expiry date.
    #[arg(long, default_value = "MM/YY")]
    pub expiry_format: ExpiryFormat,
}

impl CardCommand {
    pub fn into_request(self, config: &CliConfig) -> CardRequest {
        match self {
            CardCommand::Validate(args) => CardRequest::Validate {
                inputs: args.inputs,
            },
            CardCommand::Format(args) => CardRequest::Format {
                mask: MaskMode::from_flag(!args.unmasked),
                inputs: args.inputs,
            },
            CardCommand::Identify(args) => CardRequest::Identify {
                inputs: args.inputs,
            },
            CardCommand::Generate(args) => CardRequest::Generate {
                count: args.count.count,
                brand: args.brand,
                mask: args.count.mask(),
                include_cvv: args.cvv,
                expiry: args.expiry.map(|kind| ExpiryPolicy {
                    kind,
                    max_future_years: config.expiry_future_years,
                    max_past_years: config.expiry_past_years,
                    format: args.expiry_format,
                }),
            },
            CardCommand::Expiry(args) => CardRequest::Expiry {
                inputs: args.inputs,
            },
        }
    }
}

impl Commands {
    /// Builds the engine request, or `None` for [`Commands::Request`].
    pub fn into_request(self, config: &CliConfig) -> Option<Request> {
        match self {
            Commands::Cpf(command) => Some(Request::Cpf(command.into_request())),
            Commands::Cnpj(command) => Some(Request::Cnpj(command.into_request())),
            Commands::Card(command) => Some(Request::Card(command.into_request(config))),
            Commands::Request { .. } => None,
        }
    }
}
