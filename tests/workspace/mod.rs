mod tests_workspace;
