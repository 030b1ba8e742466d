use crate::easyeda_models::ComponentData;
use crate::error::{Error, Result};
use crate::importer::import_component_data;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;

const API_ENDPOINT: &str = "https://easyeda.com/api/products/{lcsc_id}/components?version=6.4.19.5";
const ENDPOINT_3D_MODEL_STEP: &str = "https://modules.easyeda.com/qAxj6KHrDKw4blvCG8QJPs7Y/{uuid}";
const USER_AGENT: &str = concat!("jlc-kicad/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static LCSC_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^C\d+$").expect("LCSC id pattern"));

/// Uppercases and validates an LCSC catalog id such as `C2040`.
pub fn normalize_lcsc_id(lcsc_id: &str) -> Result<String> {
    let id = lcsc_id.trim().to_ascii_uppercase();
    if LCSC_ID_PATTERN.is_match(&id) {
        Ok(id)
    } else {
        Err(Error::InvalidLcscId(lcsc_id.to_string()))
    }
}

#[derive(Deserialize, Debug)]
pub struct ApiResponse {
    pub success: bool,
    pub result: Option<Value>,
    pub code: Option<i32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EasyedaApi {
    client: reqwest::Client,
}

impl EasyedaApi {
    pub fn new() -> Result<Self> {
        Ok(EasyedaApi {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()?,
        })
    }

    pub async fn get_cad_data_of_component(&self, lcsc_id: &str) -> Result<Value> {
        let url = API_ENDPOINT.replace("{lcsc_id}", lcsc_id);
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<ApiResponse>()
            .await?;

        if !res.success {
            let msg = res
                .message
                .unwrap_or_else(|| "Unknown API error".to_string());
            return Err(Error::ComponentNotFound(format!(
                "{} (code {}): {}",
                lcsc_id,
                res.code.unwrap_or_default(),
                msg
            )));
        }
        match res.result {
            Some(Value::Null) | None => Err(Error::ComponentNotFound(lcsc_id.to_string())),
            Some(result) => Ok(result),
        }
    }

    /// Fetches and parses everything needed to convert one component.
    pub async fn get_component_data(&self, lcsc_id: &str) -> Result<ComponentData> {
        let lcsc_id = normalize_lcsc_id(lcsc_id)?;
        let cad_data = self.get_cad_data_of_component(&lcsc_id).await?;
        let mut component = import_component_data(&cad_data)?;
        if component.info.lcsc_id.is_none() {
            component.info.lcsc_id = Some(lcsc_id);
        }
        Ok(component)
    }

    /// Downloads the STEP model published under `uuid`.
    pub async fn get_step_3d_model(&self, uuid: &str) -> Result<bytes::Bytes> {
        let url = ENDPOINT_3D_MODEL_STEP.replace("{uuid}", uuid);
        debug!("GET {}", url);
        let res = self.client.get(&url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::MissingData(format!(
                "STEP model {} unavailable ({})",
                uuid, status
            )));
        }
        let step = res.bytes().await?;
        debug!("STEP model {}: {} bytes", uuid, step.len());
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lcsc_id() {
        assert_eq!(normalize_lcsc_id(" c2040 ").unwrap(), "C2040");
        assert!(matches!(normalize_lcsc_id("2040"), Err(Error::InvalidLcscId(_))));
        assert!(normalize_lcsc_id("C20a").is_err());
    }
}
