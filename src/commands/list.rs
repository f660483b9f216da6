use crate::commands::load_initial;
use crate::config::Config;
use crate::error::AppError;
use crate::models::Store;
use crate::render;
use crate::utils::backend::HttpBackend;

/// Muestra los casos de prueba, opcionalmente filtrados
pub fn list_test_cases(config: &Config, search: Option<&str>) -> Result<(), AppError> {
    let backend = HttpBackend::new(config)?;
    let mut store = Store::new();
    load_initial(&mut store, config, &backend)?;

    if let Some(term) = search {
        store.filter(term);
    }

    println!("{}", render::screen(&store));
    Ok(())
}
