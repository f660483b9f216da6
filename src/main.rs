mod commands;
mod config;
mod editor;
mod error;
mod log;
mod models;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;

use crate::commands::{export_test_cases, import_to_xray, list_test_cases, run_session};
use crate::config::Config;
use crate::error::AppError;
use crate::utils::backend::HttpBackend;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL base del backend (por defecto XRAY_TC_BASE_URL o http://127.0.0.1:5000)
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    /// Archivo con el token de autenticación guardado
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    /// Cookies a enviar en cada petición, p. ej. "session_token=abc"
    #[arg(long, global = true)]
    cookie: Option<String>,

    /// Cargar los casos desde un archivo JSON local en lugar del backend
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Tiempo máximo de cada petición, en segundos
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Mostrar el registro de depuración
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Editar casos de prueba de forma interactiva
    Edit,
    /// Mostrar los casos de prueba
    List {
        /// Texto a buscar en resumen, descripción, carpeta y pasos
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Exportar los casos de prueba a un archivo JSON
    Export {
        /// Archivo de salida (por defecto output_tc-<fecha>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Importar los casos de prueba guardados a Xray
    Import,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            token_file: self.token_file.clone(),
            cookie: self.cookie.clone(),
            data_file: self.file.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            ..Config::new(self.base_url.clone())
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = cli.config();

    match cli.command {
        None | Some(Commands::Edit) => run_session(&config),
        Some(Commands::List { search }) => list_test_cases(&config, search.as_deref()),
        Some(Commands::Export { output }) => export_test_cases(&config, output),
        Some(Commands::Import) => import_to_xray(&HttpBackend::new(&config)?),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    log::setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            ExitCode::FAILURE
        }
    }
}
