use anyhow::Context;
use clap::{Parser, Subcommand};
use goal_core::{
    config::profile_uris_from_env_value, goal_search_parameters, CarePlanGoalRecord,
    CatalogLocalizer, CodeTable, CoreConfig, FhirGoalService, FhirResourceService,
    InMemoryCarePlanStore, OrganisationProvenance, SearchFilters, SearchResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Organisation provenance is attributed to when `GOAL_ORGANISATION_ID` is unset.
const DEFAULT_ORGANISATION_ID: &str = "primary-business-entity";

#[derive(Parser)]
#[command(name = "goal")]
#[command(about = "Render care plan goals as FHIR Goal resources")]
struct Cli {
    /// JSON file holding an array of care plan records to search
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a care plan record file to a Goal resource
    Convert {
        /// Path to a JSON care plan record
        record: PathBuf,
    },
    /// Look up a goal by id
    Lookup {
        /// Goal id (the record uuid)
        id: String,
        /// Restrict the lookup to this patient
        #[arg(long)]
        patient: Option<String>,
    },
    /// Search goals
    Search {
        /// Patient reference filter, `Patient/<id>` or a bare id
        #[arg(long = "patient-ref")]
        patient_ref: Option<String>,
        /// Restrict results to this patient
        #[arg(long)]
        patient: Option<String>,
    },
    /// Emit the Provenance resource for a converted record
    Provenance {
        /// Path to a JSON care plan record
        record: PathBuf,
    },
}

/// Settings read from the environment once at startup.
struct Settings {
    organisation_id: String,
    profile_uris: Vec<String>,
    code_table: Option<PathBuf>,
    translations: Option<PathBuf>,
}

impl Settings {
    fn from_env() -> Self {
        Self {
            organisation_id: std::env::var("GOAL_ORGANISATION_ID")
                .unwrap_or_else(|_| DEFAULT_ORGANISATION_ID.into()),
            profile_uris: profile_uris_from_env_value(std::env::var("GOAL_PROFILE_URIS").ok()),
            code_table: std::env::var_os("GOAL_CODE_TABLE").map(PathBuf::from),
            translations: std::env::var_os("GOAL_TRANSLATIONS").map(PathBuf::from),
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("goal=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let service = build_service(Settings::from_env(), cli.store.as_deref())?;

    match cli.command {
        Commands::Convert { record } => {
            let record = read_record(&record)?;
            print_goal(&service, &record, cli.pretty)?;
        }
        Commands::Lookup { id, patient } => {
            let found = service.lookup_by_id(&id, patient.as_deref())?;
            if found.is_empty() {
                anyhow::bail!("no goal found with id {id}");
            }
            print_results(&service, found, cli.pretty)?;
        }
        Commands::Search {
            patient_ref,
            patient,
        } => {
            let mut filters = SearchFilters::new();
            if let Some(reference) = patient_ref {
                filters.insert(goal_core::constants::PATIENT_SEARCH_PARAM.into(), reference);
            }
            let found = service.search(&filters, patient.as_deref())?;
            print_results(&service, found, cli.pretty)?;
        }
        Commands::Provenance { record } => {
            let record = read_record(&record)?;
            let goal = service.convert(&record);
            println!("{}", service.create_provenance_json(&goal)?);
        }
    }

    Ok(())
}

fn build_service(settings: Settings, store: Option<&Path>) -> anyhow::Result<FhirGoalService> {
    let cfg = CoreConfig::new(settings.profile_uris, settings.organisation_id)?;

    let records = match store {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading record store {}", path.display()))?;
            CarePlanGoalRecord::list_from_json(&json)?
        }
        None => Vec::new(),
    };
    tracing::info!(records = records.len(), "loaded care plan records");

    let terminology = match &settings.code_table {
        Some(path) => CodeTable::from_path(path)?,
        None => CodeTable::default(),
    };

    let provenance = OrganisationProvenance::new(cfg.organisation_id());
    let mut service = FhirGoalService::new(
        Arc::new(cfg),
        Arc::new(InMemoryCarePlanStore::new(records, goal_search_parameters())),
        Arc::new(terminology),
        Arc::new(provenance),
    );

    if let Some(path) = &settings.translations {
        service = service.with_localizer(Arc::new(CatalogLocalizer::from_path(path)?));
    }

    Ok(service)
}

fn read_record(path: &Path) -> anyhow::Result<CarePlanGoalRecord> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading care plan record {}", path.display()))?;
    Ok(CarePlanGoalRecord::from_json(&json)?)
}

fn print_goal(
    service: &FhirGoalService,
    record: &CarePlanGoalRecord,
    pretty: bool,
) -> anyhow::Result<()> {
    let rendered = if pretty {
        fhir::Goal::render_pretty(&service.convert(record))?
    } else {
        service.convert_to_json(record)?
    };
    println!("{rendered}");
    Ok(())
}

fn print_results(
    service: &FhirGoalService,
    found: SearchResult<CarePlanGoalRecord>,
    pretty: bool,
) -> anyhow::Result<()> {
    if found.is_empty() {
        println!("No goals found.");
    }
    for record in found {
        print_goal(service, &record, pretty)?;
    }
    Ok(())
}
