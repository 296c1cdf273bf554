use anyhow::{Context, bail};
use serde::Serialize;

use shopno_admin::resources::{
    Companies, ContactPages, Facilities, FooterLinks, HeaderLinks, PropertyTypes, Roles, Users,
};
use shopno_admin::{CrudController, Resource};
use shopno_auth::{default_admin_menu, visible_menu};
use shopno_client::{ApiClient, AuthApi, ClientConfig, Session};

const EMAIL_ENV: &str = "SHOPNO_EMAIL";
const PASSWORD_ENV: &str = "SHOPNO_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shopno_observability::init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    let session = Session::from_config(&config);
    let client = ApiClient::new(config, session.clone())?;
    let auth = AuthApi::new(client.clone());

    match (std::env::var(EMAIL_ENV), std::env::var(PASSWORD_ENV)) {
        (Ok(email), Ok(password)) => {
            auth.login(&email, &password).await.context("login failed")?;
        }
        _ if session.is_authenticated() => {
            tracing::info!("using configured auth token");
        }
        _ => bail!("set {EMAIL_ENV}/{PASSWORD_ENV} or SHOPNO_AUTH_TOKEN"),
    }

    let user = auth.current_user().await.context("failed to fetch current user")?;
    let menu = visible_menu(Some(&user), &default_admin_menu());
    println!("{}", serde_json::to_string_pretty(&menu)?);

    let resource = std::env::args().nth(1).unwrap_or_else(|| Companies::PATH.to_string());
    match resource.as_str() {
        Companies::PATH => print_list::<Companies>(&client).await,
        Facilities::PATH => print_list::<Facilities>(&client).await,
        PropertyTypes::PATH => print_list::<PropertyTypes>(&client).await,
        Users::PATH => print_list::<Users>(&client).await,
        Roles::PATH => print_list::<Roles>(&client).await,
        HeaderLinks::PATH => print_list::<HeaderLinks>(&client).await,
        FooterLinks::PATH => print_list::<FooterLinks>(&client).await,
        ContactPages::PATH => print_list::<ContactPages>(&client).await,
        other => bail!("unknown resource '{other}'"),
    }
}

async fn print_list<R>(client: &ApiClient) -> anyhow::Result<()>
where
    R: Resource,
    R::Entity: Serialize,
{
    let mut controller = CrudController::<R>::over_http(client);
    controller
        .reload()
        .await
        .with_context(|| format!("failed to load {}", R::PATH))?;
    println!("{}", serde_json::to_string_pretty(&controller.sorted_items())?);
    Ok(())
}
