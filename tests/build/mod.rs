mod tests_cache;
mod tests_errors;
mod tests_resolution;
