//! Build identity supplied by Concourse.
//!
//! Concourse exposes the running build's coordinates to `out` scripts via
//! environment variables. They are captured once into a plain struct and
//! passed explicitly into the composer, which keeps composition pure and
//! testable without mutating the process environment.

use std::env;

/// Environment variable for the pipeline name.
const ENV_PIPELINE_NAME: &str = "BUILD_PIPELINE_NAME";
/// Environment variable for the job name.
const ENV_JOB_NAME: &str = "BUILD_JOB_NAME";
/// Environment variable for the build name (the number shown in the UI).
const ENV_BUILD_NAME: &str = "BUILD_NAME";
/// Environment variable for the team name.
const ENV_TEAM_NAME: &str = "BUILD_TEAM_NAME";
/// Environment variable for the externally reachable ATC base URL.
const ENV_ATC_EXTERNAL_URL: &str = "ATC_EXTERNAL_URL";

/// Read-only build coordinates for one invocation.
///
/// Every field is optional in the environment; absent values render as
/// empty strings rather than failing the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    pub pipeline: String,
    pub job: String,
    pub build: String,
    pub team: String,
    pub atc_url: String,
}

impl BuildContext {
    /// Capture the build identity from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            pipeline: env::var(ENV_PIPELINE_NAME).unwrap_or_default(),
            job: env::var(ENV_JOB_NAME).unwrap_or_default(),
            build: env::var(ENV_BUILD_NAME).unwrap_or_default(),
            team: env::var(ENV_TEAM_NAME).unwrap_or_default(),
            atc_url: env::var(ENV_ATC_EXTERNAL_URL).unwrap_or_default(),
        }
    }

    /// Render the web URL of this build in the Concourse UI.
    #[must_use]
    pub fn build_url(&self) -> String {
        format!(
            "{}/teams/{}/pipelines/{}/jobs/{}/builds/{}",
            self.atc_url, self.team, self.pipeline, self.job, self.build
        )
    }
}
