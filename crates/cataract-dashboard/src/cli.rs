use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::form::PatientForm;

#[derive(Parser, Debug)]
#[command(name = "cataract-dashboard")]
#[command(author, version, about = "Cataract risk screening dashboard")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server with web UI
    Serve(ServeArgs),

    /// Run a single prediction and print it as JSON
    Predict(PredictArgs),

    /// Print the status of a model artifact as JSON
    Inspect {
        /// Model artifact path
        #[arg(short, long, default_value = cataract_classifiers::DEFAULT_ARTIFACT_PATH)]
        model: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Configuration file
    #[arg(short, long, default_value = "./dashboard.yaml")]
    pub config: PathBuf,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Listen address
    #[arg(short, long)]
    pub address: Option<String>,

    /// Model artifact path
    #[arg(short, long, env = "CATARACT_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Load the model before accepting requests
    #[arg(long)]
    pub preload: bool,

    /// Preview dataset (CSV)
    #[arg(short, long, env = "CATARACT_DATASET_PATH")]
    pub dataset: Option<PathBuf>,

    /// Outcome column of the preview dataset
    #[arg(long)]
    pub outcome_column: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Model artifact path
    #[arg(short, long, default_value = cataract_classifiers::DEFAULT_ARTIFACT_PATH)]
    pub model: PathBuf,

    /// Age in years (0-120)
    #[arg(long, default_value = "65")]
    pub age: f64,

    /// male or female
    #[arg(long, default_value = "male")]
    pub sex: String,

    /// Family history of cataract (yes/no)
    #[arg(long, default_value = "yes")]
    pub family_history: String,

    /// Lens opacity (0-10)
    #[arg(long, default_value = "5.0")]
    pub lens_opacity: f64,

    /// Acuity decline (0-10)
    #[arg(long, default_value = "5")]
    pub acuity_decline: f64,

    /// Light sensitivity (0-10)
    #[arg(long, default_value = "5")]
    pub light_sensitivity: f64,

    /// Color perception change (yes/no)
    #[arg(long, default_value = "yes")]
    pub color_change: String,

    /// Double vision (yes/no)
    #[arg(long, default_value = "yes")]
    pub double_vision: String,

    /// Intraocular pressure in mmHg (10-30)
    #[arg(long, default_value = "18.0")]
    pub intraocular_pressure: f64,

    /// Slit-lamp result (normal/abnormal)
    #[arg(long, default_value = "normal")]
    pub slitlamp_result: String,

    /// Visual acuity (0-1)
    #[arg(long, default_value = "0.5")]
    pub visual_acuity: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl PredictArgs {
    pub fn form(&self) -> PatientForm {
        PatientForm {
            age: self.age,
            sex: self.sex.clone(),
            family_history: self.family_history.clone(),
            lens_opacity: self.lens_opacity,
            acuity_decline: self.acuity_decline,
            light_sensitivity: self.light_sensitivity,
            color_change: self.color_change.clone(),
            double_vision: self.double_vision.clone(),
            intraocular_pressure: self.intraocular_pressure,
            slitlamp_result: self.slitlamp_result.clone(),
            visual_acuity: self.visual_acuity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["cataract-dashboard", "serve", "--port", "9000", "-v"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.verbose);
                assert_eq!(args.config, PathBuf::from("./dashboard.yaml"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_predict_defaults() {
        let cli = Cli::try_parse_from(["cataract-dashboard", "predict", "--sex", "female"]).unwrap();
        match cli.command {
            Commands::Predict(args) => {
                let form = args.form();
                assert_eq!(form.sex, "female");
                assert_eq!(form.age, 65.0);
                assert_eq!(form.visual_acuity, 0.5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
