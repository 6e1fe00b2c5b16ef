//! Remote module lookup against a pvfree service.
//!
//! pvfree serves the CEC and Sandia module libraries over a REST API:
//! `GET {base}/api/v1/{cecmodule|pvmodule}/{id}/` returns one module as a
//! flat JSON object whose keys match the SAM library columns.

use std::time::Duration;

use pvplant_core::{ModuleSchema, PlantError, PlantResult, RawRecord};
use serde_json::Value;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://pvfree.herokuapp.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Module collections published by pvfree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PvfreeDatabase {
    CecModule,
    PvModule,
}

impl PvfreeDatabase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PvfreeDatabase::CecModule => "cecmodule",
            PvfreeDatabase::PvModule => "pvmodule",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "cecmodule" => Some(PvfreeDatabase::CecModule),
            "pvmodule" => Some(PvfreeDatabase::PvModule),
            _ => None,
        }
    }

    pub fn schema(&self) -> ModuleSchema {
        match self {
            PvfreeDatabase::CecModule => ModuleSchema::CecModule,
            PvfreeDatabase::PvModule => ModuleSchema::SandiaModule,
        }
    }
}

/// Blocking pvfree client.
pub struct PvfreeClient {
    agent: ureq::Agent,
    base_url: String,
}

impl PvfreeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn module_url(&self, database: PvfreeDatabase, id: u64) -> String {
        format!("{}/api/v1/{}/{}/", self.base_url, database.as_str(), id)
    }

    /// Fetch one module record by its numeric id.
    pub fn fetch_module(&self, database: PvfreeDatabase, id: u64) -> PlantResult<RawRecord> {
        let url = self.module_url(database, id);
        debug!(url = %url, "requesting module from pvfree");

        let response = self.agent.get(&url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => PlantError::Lookup(format!(
                "pvfree returned status {code} for {} {id}",
                database.as_str()
            )),
            ureq::Error::Transport(transport) => {
                PlantError::Lookup(format!("pvfree request to {url} failed: {transport}"))
            }
        })?;

        let body: Value = response.into_json().map_err(|e| {
            PlantError::Lookup(format!("pvfree response for {} {id} is not JSON: {e}", database.as_str()))
        })?;
        let record = module_record(body, database, id)?;

        if let Some(name) = record.get("Name").and_then(Value::as_str) {
            info!(module = name, database = database.as_str(), "fetched module from pvfree");
        }
        Ok(record)
    }
}

impl Default for PvfreeClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Accept only a JSON object as a module record.
pub fn module_record(body: Value, database: PvfreeDatabase, id: u64) -> PlantResult<RawRecord> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(PlantError::Lookup(format!(
            "pvfree returned a non-object body for {} {id}: {other}",
            database.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvplant_core::ModuleSource;
    use serde_json::json;

    #[test]
    fn test_module_url() {
        let client = PvfreeClient::new("https://pvfree.example.org/", Duration::from_secs(5));
        assert_eq!(
            client.module_url(PvfreeDatabase::CecModule, 1234),
            "https://pvfree.example.org/api/v1/cecmodule/1234/"
        );
        assert_eq!(
            client.module_url(PvfreeDatabase::PvModule, 7),
            "https://pvfree.example.org/api/v1/pvmodule/7/"
        );
    }

    #[test]
    fn test_non_object_body_is_lookup_error() {
        let err = module_record(json!(["not", "a", "module"]), PvfreeDatabase::PvModule, 3)
            .unwrap_err();
        assert!(matches!(err, PlantError::Lookup(_)));
    }

    #[test]
    fn test_sandia_response_normalizes() {
        let body = json!({
            "id": 3,
            "Name": "Advent Solar AS160 [2006 (E)]",
            "Material": "mc-Si",
            "Cells_in_Series": 60,
            "Isco": 7.58,
            "Voco": 36.2,
            "Impo": 6.97,
            "Vmpo": 28.6,
            "Aisc": 0.000675,
            "Bvoco": -0.1326,
        });
        let record = module_record(body, PvfreeDatabase::PvModule, 3).unwrap();
        let params = ModuleSource::from_record(PvfreeDatabase::PvModule.schema(), &record)
            .unwrap()
            .normalize()
            .unwrap();
        assert_eq!(params.n_s, 60);
        assert_eq!(params.alpha_sc.value(), 0.0675);
        assert_eq!(params.stc.value(), 199.34);
    }

    #[test]
    fn test_unreachable_service_is_lookup_error() {
        let client = PvfreeClient::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = client.fetch_module(PvfreeDatabase::CecModule, 1).unwrap_err();
        assert!(matches!(err, PlantError::Lookup(_)));
    }

    #[test]
    fn test_database_names() {
        assert_eq!(PvfreeDatabase::from_name("pvmodule"), Some(PvfreeDatabase::PvModule));
        assert_eq!(PvfreeDatabase::CecModule.schema(), ModuleSchema::CecModule);
        assert!(PvfreeDatabase::from_name("CECMod").is_none());
    }
}
