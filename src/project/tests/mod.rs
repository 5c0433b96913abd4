mod tests_artifact;
#[cfg(feature = "workspace")]
mod tests_workspace_config;
