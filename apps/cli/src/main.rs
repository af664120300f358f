use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{FormController, FormField, SubmitOutcome, SubmitStatus};
use shared::domain::{document_type_options, Company, DOCUMENT_TYPE_OTHER};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "certidao", about = "Register certidões through the submission relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the form from flags and submit it once.
    Submit(SubmitArgs),
    /// Print the companies with their CNPJ and the document types.
    Catalog,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[arg(long, env = "CERTIDAO_RELAY_URL", default_value = "http://127.0.0.1:3000")]
    relay_url: String,
    #[arg(long)]
    empresa: String,
    /// Overrides the CNPJ filled in from the company catalog.
    #[arg(long)]
    cnpj: Option<String>,
    /// Up to five notification addresses; repeat the flag.
    #[arg(long = "email")]
    emails: Vec<String>,
    #[arg(long)]
    tipo: String,
    /// Custom document type, required when --tipo is "Outro".
    #[arg(long)]
    especificar: Option<String>,
    #[arg(long)]
    orgao: String,
    #[arg(long)]
    emissao: String,
    #[arg(long)]
    vigencia: String,
    #[arg(long)]
    status: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Catalog => print_catalog(),
        Command::Submit(args) => submit(args).await?,
    }
    Ok(())
}

fn print_catalog() {
    println!("Empresas:");
    for company in Company::ALL {
        println!("  {:<20} {}", company.as_str(), company.cnpj());
    }
    println!("Tipos de documento:");
    for option in document_type_options() {
        println!("  {option}");
    }
}

async fn submit(args: SubmitArgs) -> Result<()> {
    if args.tipo == DOCUMENT_TYPE_OTHER && args.especificar.as_deref().unwrap_or("").is_empty() {
        bail!("--especificar is required when --tipo is \"{DOCUMENT_TYPE_OTHER}\"");
    }

    let controller = FormController::new(&args.relay_url);
    controller.set_field(FormField::Company, &args.empresa);
    if let Some(cnpj) = &args.cnpj {
        controller.set_field(FormField::TaxId, cnpj);
    }
    for email in &args.emails {
        if let Err(err) = controller.add_email(email) {
            warn!(%email, %err, "email skipped");
            eprintln!("{email}: {err}");
        }
    }
    controller.set_field(FormField::DocumentTypeSelection, &args.tipo);
    if let Some(custom) = &args.especificar {
        controller.set_field(FormField::DocumentTypeText, custom);
    }
    controller.set_field(FormField::IssuingBody, &args.orgao);
    controller.set_field(FormField::IssuedOn, &args.emissao);
    controller.set_field(FormField::ValidUntil, &args.vigencia);
    controller.set_field(FormField::StatusNote, &args.status);

    match controller.submit().await {
        SubmitOutcome::Saved => {
            if let Some(message) = controller.status().message() {
                println!("{message}");
            }
            Ok(())
        }
        SubmitOutcome::Failed(_) | SubmitOutcome::AlreadySubmitting => match controller.status() {
            SubmitStatus::Error { message, detail } => match detail {
                Some(detail) => bail!("{message} ({detail})"),
                None => bail!("{message}"),
            },
            other => bail!("submission did not complete: {other:?}"),
        },
    }
}
