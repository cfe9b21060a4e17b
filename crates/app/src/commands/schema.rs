//! `graphit schema`

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use graphit_application::{ExecuteRequest, FetchSchema};
use graphit_domain::{ClientSettings, RequestOptions};
use graphit_infrastructure::ReqwestHttpClient;

use super::{load_context, print_json};
use crate::cli::SchemaArgs;
use crate::definition::RequestFile;

pub async fn execute(args: &SchemaArgs, settings: &ClientSettings) -> Result<ExitCode> {
    let context = load_context(args.env.env.as_deref()).await?;

    let options = match (&args.request, &args.endpoint) {
        (Some(path), _) => RequestFile::load(path).await?.base_options(
            String::new(),
            context,
            settings.request_timeout_ms,
        ),
        (None, Some(endpoint)) => RequestOptions::new(endpoint, "")
            .with_timeout_ms(settings.request_timeout_ms)
            .with_context(context),
        (None, None) => anyhow::bail!("Pass a request file or --endpoint"),
    };

    let client = ReqwestHttpClient::with_settings(settings)?;
    let executor = ExecuteRequest::new(Arc::new(client)).with_settings(settings);
    let schema = FetchSchema::new(executor).execute(&options).await?;

    if args.json {
        print_json(&schema)?;
    } else {
        print!("{}", schema.to_sdl());
    }
    Ok(ExitCode::SUCCESS)
}
