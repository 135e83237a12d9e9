// Session bootstrap: resolve a working server URL, then exchange credentials
// for an environment-scoped API key. Both steps prefer values from the local
// config and fall back to prompting; both retry without limit — the operator
// is the only party that can break the loop.

use std::future::Future;

use anyhow::Result;

use crate::api::{ChiliClient, KeyOutcome, RemoteApi, Session};
use crate::config::FileConfig;
use crate::ui::{self, Prompt};

/// Run the full bootstrap. Returns the verified client together with the
/// immutable session value the rest of the program reads.
pub async fn bootstrap(prompt: &dyn Prompt, config: &FileConfig) -> Result<(ChiliClient, Session)> {
    let url = resolve_url(prompt, config, |url| async move {
        match ChiliClient::new(&url) {
            Ok(client) => client.server_date().await.is_ok(),
            Err(_) => false,
        }
    })
    .await?;
    let client = ChiliClient::new(&url)?;
    let (environment, api_key) = resolve_credentials(&client, prompt, config).await?;
    let session = Session {
        url: client.base_url().to_string(),
        environment,
        api_key,
    };
    Ok((client, session))
}

/// Find a URL that answers the server-date probe. The config URL is tried
/// first and fails silently into the prompt loop; every failed prompted URL
/// prints remediation guidance before re-prompting.
pub async fn resolve_url<V, Fut>(
    prompt: &dyn Prompt,
    config: &FileConfig,
    mut verify: V,
) -> Result<String>
where
    V: FnMut(String) -> Fut,
    Fut: Future<Output = bool>,
{
    if let Some(url) = &config.url {
        if verify(url.clone()).await {
            return Ok(url.clone());
        }
    }
    loop {
        let url = prompt.input("What is the CHILI URL?")?;
        if verify(url.clone()).await {
            return Ok(url);
        }
        ui::banner(&["Unable to connect to API"]);
        println!("Type this into your browser: {}/version.xml", url);
        println!(
            "If you do not see <version name=\"x.x.x\" build=\"x\" internalBuild=\"xxxx\" warningLabel=\"\"/> then this is the wrong URL"
        );
        println!();
    }
}

/// Exchange credentials for an API key, looping until the server issues one.
/// Returns (environment, api key). A rejection surfaces the server's message
/// verbatim; a transport failure gets a blunt warning. Both are retried.
pub async fn resolve_credentials(
    api: &dyn RemoteApi,
    prompt: &dyn Prompt,
    config: &FileConfig,
) -> Result<(String, String)> {
    if let Some((environment, username, password)) = config.credentials() {
        if let Ok(KeyOutcome::Issued(key)) =
            api.generate_api_key(&environment, &username, &password).await
        {
            return Ok((environment, key));
        }
        // Config credentials that fail fall through to prompting, quietly.
    }
    loop {
        let environment = prompt.input("What is the environment name?")?;
        let username = prompt.input("What is your username?")?;
        let password = prompt.password("What is your password?")?;
        match api.generate_api_key(&environment, &username, &password).await {
            Ok(KeyOutcome::Issued(key)) => return Ok((environment, key)),
            Ok(KeyOutcome::Rejected(message)) => {
                ui::banner(&["Error generating API key"]);
                println!("Error message:");
                println!("{}", message);
                println!();
            }
            Err(_) => {
                ui::banner(&["Error generating API key"]);
                println!("Error message:");
                println!("Web error - something is very wrong and this probably will not work");
                println!();
            }
        }
    }
}
