//! Very basic functionality to read and write default cost parameters
//! into a toml configuration file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "costs.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CostsToml {
    #[serde(default = "default_uf")]
    uf: f64,

    #[serde(default = "default_ub")]
    ub: f64,

    #[serde(default = "default_rd")]
    rd: f64,

    #[serde(default = "default_wd")]
    wd: f64,
}

impl CostsToml {
    pub fn read_toml() -> CostsToml {
        if Path::new(CONFIG_FILE).exists() {
            let config_content = fs::read_to_string(CONFIG_FILE)
                .expect("Config file {CONFIG_FILE} could not be read.");
            let config: CostsToml = toml::from_str(&config_content)
                .expect("Config file {CONFIG_FILE} could not be parsed.");
            config
        } else {
            println!(
                "Config file {CONFIG_FILE} not found, creating a new one with default values."
            );
            let default_config = CostsToml::default();
            let toml_string = toml::to_string_pretty(&default_config)
                .expect("Failed to serialize default config");
            let write_result = fs::write(CONFIG_FILE, toml_string);
            if write_result.is_err() {
                println!(
                    "ERROR: Config file {CONFIG_FILE} was not found and could not be written. Using default values, some functionality might not be available."
                );
            }
            default_config
        }
    }

    pub fn uf(&self) -> f64 {
        self.uf
    }

    pub fn ub(&self) -> f64 {
        self.ub
    }

    pub fn rd(&self) -> f64 {
        self.rd
    }

    pub fn wd(&self) -> f64 {
        self.wd
    }
}

impl Default for CostsToml {
    fn default() -> Self {
        CostsToml {
            uf: default_uf(),
            ub: default_ub(),
            rd: default_rd(),
            wd: default_wd(),
        }
    }
}

fn default_uf() -> f64 {
    1.0
}

fn default_ub() -> f64 {
    1.0
}

fn default_rd() -> f64 {
    1.0
}

fn default_wd() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_costs_toml_is_unit() {
        let costs = CostsToml::default();
        assert_eq!(costs.uf(), 1.0);
        assert_eq!(costs.wd(), 1.0);
    }
}
