use declconf::{Config, ConfigProvider};

fn main() -> Result<(), declconf::ConfigError> {
    // Environment variables win; the TOML document supplies the rest.
    let toml = ConfigProvider::from_toml_str(
        r#"
        [app]
        name = "demo"
        debug = false

        [app.database]
        host = "localhost"
        port = 5432
        "#,
    )
    .expect("embedded TOML is well formed");
    let provider = ConfigProvider::from_env().nested("DEMO").or_else(toml);

    let database = Config::string()
        .nested("host")
        .zip(Config::integer().nested("port"))
        .zip_with(
            Config::secret().nested("password").optional(),
            |(host, port), password| (host, port, password),
        )
        .nested("database");

    let description = Config::string()
        .nested("name")
        .zip(Config::boolean().nested("debug").with_default(false))
        .zip(database)
        .nested("app");

    let ((name, debug), (host, port, password)) = provider.load(&description)?;

    println!("app: {name} (debug={debug})");
    println!("database: {host}:{port}");
    match password {
        Some(secret) => println!("password: {secret} ({} bytes)", secret.expose().len()),
        None => println!("password: not configured"),
    }

    Ok(())
}
