// ABOUTME: vet-qr - command-line driver for the Central Vet QR lookup and import flow
// ABOUTME: Decoded QR payloads are passed as arguments and replayed through a scripted camera
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet
//!
//! Usage:
//! ```bash
//! # Who am I signed in as
//! CENTRAL_VET_ACCESS_TOKEN=... vet-qr whoami
//!
//! # Look a pet up from the text of its tag
//! vet-qr lookup "https://centralvet.cl/qr/3f2b8c1e-9a4d-4e7f-8b6a-1c2d3e4f5a6b"
//!
//! # Claim it with its edit code
//! vet-qr import 3f2b8c1e-9a4d-4e7f-8b6a-1c2d3e4f5a6b --edit-code 123456
//!
//! # List my pets
//! vet-qr pets
//! ```

use anyhow::{anyhow, Result};
use central_vet::api::{AccountApi, ApiClient};
use central_vet::auth::{SessionToken, TokenSource};
use central_vet::camera::ScriptedCamera;
use central_vet::config::ClientConfig;
use central_vet::errors::UserFacing;
use central_vet::flow::{
    FlowAction, FlowDeps, FlowState, ImportFlow, Navigator, ScanMode, ScanOutcome,
};
use central_vet::logging::{LogFormat, LoggingConfig};
use central_vet::models::{PetListExtra, PetSummary, Role};
use central_vet::public_pet::LostPetContact;
use central_vet::scanner::TextDecoder;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "vet-qr",
    about = "Central Vet QR lookup and import",
    long_about = "Drives the pet QR flow against the clinic API configured by CENTRAL_VET_* variables."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Scan mode override (defaults to the mode of the signed-in role)
    #[arg(long, value_enum, global = true)]
    mode: Option<ModeArg>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Show the signed-in user
    Whoami,

    /// Look a pet up from decoded QR text
    Lookup {
        /// Decoded QR text
        payload: String,
    },

    /// Claim a pet with its edit code
    Import {
        /// Decoded QR text
        payload: String,

        /// Edit code of the pet
        #[arg(long)]
        edit_code: String,
    },

    /// List pets visible to the signed-in user
    Pets,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    View,
    ImportVet,
    ImportOwner,
}

impl From<ModeArg> for ScanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::View => Self::View,
            ModeArg::ImportVet => Self::ImportVet,
            ModeArg::ImportOwner => Self::ImportOwner,
        }
    }
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, route: &str) {
        println!("Open {route}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".into();
        logging.format = LogFormat::Compact;
    }
    logging.init()?;

    let config = ClientConfig::from_env()?;
    let session = Arc::new(match &config.access_token {
        Some(token) => SessionToken::with_token(token.clone()),
        None => SessionToken::anonymous(),
    });
    let api = ApiClient::from_config(&config, Arc::clone(&session) as Arc<dyn TokenSource>);

    match cli.command {
        Command::Whoami => {
            let user = api.whoami().await.map_err(|e| anyhow!("whoami failed: {e}"))?;
            println!("{} ({}) id={}", user.username, user.role_name, user.id);
        }
        Command::Pets => {
            let role = current_role(&api, &session).await?.ok_or_else(|| {
                anyhow!("sign in first: set CENTRAL_VET_ACCESS_TOKEN")
            })?;
            let pets = api.list_pets(role).await?;
            for pet in &pets {
                let extra = match &pet.extra {
                    PetListExtra::Vet { owner_name, .. } => {
                        owner_name.clone().unwrap_or_default()
                    }
                    PetListExtra::Owner { home_clinic } => home_clinic.clone().unwrap_or_default(),
                    PetListExtra::Admin => String::new(),
                };
                println!(
                    "{:>6}  {:<16} {:<10} {:?}  {extra}",
                    pet.id, pet.name, pet.species, pet.status
                );
            }
            println!("{} pet(s)", pets.len());
        }
        Command::Lookup { payload } => {
            let mode = resolve_mode(cli.mode, &api, &session).await?;
            let flow = scripted_flow(mode, &api, &config, &payload);
            let outcome = scan(&flow).await;
            flow.close().await;
            if let ScanOutcome::Found(pet) = outcome? {
                print_pet(&pet);
                println!("Actions: {}", flow_actions(mode, &pet).join(" · "));
            }
        }
        Command::Import { payload, edit_code } => {
            let mode = resolve_mode(cli.mode, &api, &session).await?;
            if !mode.is_import() {
                return Err(anyhow!("importing requires a signed-in vet or owner"));
            }
            let flow = scripted_flow(mode, &api, &config, &payload);
            let result = import(&flow, edit_code).await;
            flow.close().await;
            result?;
        }
    }
    Ok(())
}

async fn current_role(api: &ApiClient, session: &SessionToken) -> Result<Option<Role>> {
    if !session.is_authenticated().await {
        return Ok(None);
    }
    let user = api.whoami().await.map_err(|e| anyhow!("whoami failed: {e}"))?;
    debug!(role = %user.role_name, "resolved role");
    Ok(Some(user.role_name))
}

async fn resolve_mode(
    requested: Option<ModeArg>,
    api: &ApiClient,
    session: &SessionToken,
) -> Result<ScanMode> {
    match requested {
        Some(mode) => Ok(mode.into()),
        None => Ok(ScanMode::for_role(current_role(api, session).await?)),
    }
}

fn scripted_flow(
    mode: ScanMode,
    api: &ApiClient,
    config: &ClientConfig,
    payload: &str,
) -> ImportFlow {
    let camera = ScriptedCamera::new(Duration::from_millis(10));
    camera.show(payload);
    ImportFlow::open(
        mode,
        FlowDeps {
            api: Arc::new(api.clone()),
            camera: Arc::new(camera),
            decoder: Arc::new(TextDecoder),
            navigator: Arc::new(PrintNavigator),
            cache: api.cache().clone(),
            scanner: config.scanner,
        },
    )
}

async fn scan(flow: &ImportFlow) -> Result<ScanOutcome> {
    flow.start_scan()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    flow.next_scan().await.map_err(|e| anyhow!(e.user_message()))
}

async fn import(flow: &ImportFlow, edit_code: String) -> Result<()> {
    let ScanOutcome::Found(pet) = scan(flow).await? else {
        return Ok(());
    };
    print_pet(&pet);
    flow.begin_import()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    flow.set_edit_code(edit_code)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    flow.submit_import()
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    if let Some(notice) = flow.snapshot().await.notice {
        println!("{}", notice.text);
    }
    Ok(())
}

fn flow_actions(mode: ScanMode, pet: &PetSummary) -> Vec<&'static str> {
    FlowAction::available(FlowState::Info, mode, Some(pet))
        .into_iter()
        .map(FlowAction::label)
        .collect()
}

fn print_pet(pet: &PetSummary) {
    let profile = pet.profile();
    println!("{} ({}) #{}", profile.name, profile.species, profile.id);
    if let Some(breed) = &profile.breed {
        println!("  Raza: {breed}");
    }
    println!("  Estado: {:?}", profile.status);
    if let Some(birthdate) = profile.birthdate {
        println!("  Nacimiento: {}", birthdate.format("%d/%m/%Y"));
    }
    if let Some(clinic) = &profile.clinic {
        println!("  Clínica: {}", clinic.name);
    }
    println!("  Acceso: {:?}", pet.access_level());
    if let Some(contact) = LostPetContact::for_pet(pet) {
        println!("  ¡Perdida! Contacto: {}", contact.owner_name.unwrap_or_default());
        if let Some(link) = contact.whatsapp_url {
            println!("    WhatsApp: {link}");
        }
        if let Some(link) = contact.mailto_url {
            println!("    Correo: {link}");
        }
    }
}
