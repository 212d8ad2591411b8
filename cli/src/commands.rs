use anyhow::{Result, anyhow};
use comfy_table::Table;
use inquire::{Confirm, Password, Text};

use crate::auth::AuthConfig;
use crate::client::{
    ApiClient, DEFAULT_API_URL, FavoriteLocation, LocationSearchResult, WeatherSnapshot,
};
use crate::logger::Logger;

fn resolve_api_url(flag: &Option<String>, stored: &AuthConfig) -> String {
    flag.clone()
        .or_else(|| std::env::var("SKYCAST_API_URL").ok())
        .or_else(|| stored.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Anonymous client: weather and search don't need credentials, but a stored
/// token is still attached when present so responses use the account's units.
fn open_client(flag: &Option<String>) -> Result<ApiClient> {
    let stored = AuthConfig::load().unwrap_or_default();
    ApiClient::new(resolve_api_url(flag, &stored), stored.token)
}

/// Client for account routes. Fails up front when nobody is signed in.
fn signed_in_client(flag: &Option<String>) -> Result<ApiClient> {
    let stored = AuthConfig::load()?;
    if stored.token.is_none() {
        return Err(anyhow!("Not signed in. Run `skycast login` first."));
    }
    ApiClient::new(resolve_api_url(flag, &stored), stored.token)
}

async fn resolve_place(client: &ApiClient, place: &str) -> Result<LocationSearchResult> {
    let mut results = client.search(place).await?;
    if results.is_empty() {
        return Err(anyhow!("No locations found for '{place}'"));
    }
    Ok(results.remove(0))
}

fn unit_symbol(unit: &str) -> &'static str {
    if unit == "fahrenheit" { "°F" } else { "°C" }
}

fn place_label(place: &LocationSearchResult) -> String {
    if place.country.is_empty() {
        place.name.clone()
    } else {
        format!("{}, {}", place.name, place.country)
    }
}

pub async fn register(api_url: &Option<String>) -> Result<()> {
    let email = Text::new("Email:").prompt()?;
    let username = Text::new("Username:").prompt()?;
    let password = Password::new("Password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    Logger::info("Creating your SkyCast account...");

    let mut auth = AuthConfig::load().unwrap_or_default();
    let url = resolve_api_url(api_url, &auth);
    let client = ApiClient::new(url.clone(), None)?;
    match client.register(email.trim(), username.trim(), &password).await {
        Ok(data) => {
            auth.token = Some(data.token);
            auth.email = Some(data.user.email.clone());
            auth.api_url = Some(url);
            auth.save()?;
            Logger::success(format!(
                "Welcome, {}! You are signed in.",
                Logger::highlight(&data.user.username)
            ));
        }
        Err(e) => Logger::error(format!("Registration failed: {e}")),
    }

    Ok(())
}

pub async fn login(api_url: &Option<String>) -> Result<()> {
    let email = Text::new("Email:").prompt()?;
    let password = Password::new("Password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    Logger::info("Signing in...");

    let mut auth = AuthConfig::load().unwrap_or_default();
    let url = resolve_api_url(api_url, &auth);
    let client = ApiClient::new(url.clone(), None)?;
    match client.login(email.trim(), &password).await {
        Ok(data) => {
            auth.token = Some(data.token);
            auth.email = Some(data.user.email.clone());
            auth.api_url = Some(url);
            auth.save()?;
            Logger::success(format!(
                "Signed in as {}",
                Logger::highlight(&data.user.username)
            ));
        }
        Err(e) => Logger::error(format!("Login failed: {e}")),
    }

    Ok(())
}

pub fn logout() -> Result<()> {
    AuthConfig::logout()?;
    Logger::success("Signed out and cleared stored credentials.");
    Ok(())
}

pub async fn profile(api_url: &Option<String>) -> Result<()> {
    let client = signed_in_client(api_url)?;
    let data = client.profile().await?;
    let user = data.user;

    Logger::header(&user.username);
    Logger::info(format!("Email: {}", user.email));
    Logger::info(format!(
        "Units: {}  Theme: {}  Notifications: {}",
        user.preferences.temperature_unit,
        user.preferences.theme,
        if user.preferences.notifications { "on" } else { "off" }
    ));

    if user.favorite_locations.is_empty() {
        Logger::info(Logger::dim("No favorite locations saved."));
    } else {
        print_favorites(&user.favorite_locations);
    }

    Ok(())
}

pub async fn refresh(api_url: &Option<String>) -> Result<()> {
    let client = signed_in_client(api_url)?;
    let data = client.refresh().await?;

    let mut auth = AuthConfig::load()?;
    auth.token = Some(data.token);
    auth.save()?;
    Logger::success("Session token refreshed.");
    Ok(())
}

pub async fn current(api_url: &Option<String>, place: &str) -> Result<()> {
    let client = open_client(api_url)?;
    let resolved = resolve_place(&client, place).await?;
    let snapshot = client
        .current(resolved.latitude, resolved.longitude)
        .await?;

    let unit = unit_symbol(&snapshot.temperature_unit);
    let current = &snapshot.current;

    Logger::header(place_label(&resolved));
    println!(
        "  {}  {}  {}{}  {}",
        current.icon,
        current.description,
        current.temperature,
        unit,
        Logger::dim(if current.is_day { "(day)" } else { "(night)" })
    );
    if let Some(feels_like) = current.feels_like {
        Logger::info(format!("Feels like {feels_like:.1}{unit}"));
    }
    Logger::info(format!(
        "Wind {:.1} km/h ({:.0}°)  Humidity {:.0}%  Pressure {:.0} hPa",
        current.wind_speed, current.wind_direction, current.humidity, current.pressure
    ));
    Logger::info(format!(
        "Rain {:.1} mm  Visibility {:.1} km",
        current.rain, current.visibility
    ));
    println!(
        "  {}",
        Logger::dim(format!(
            "{:.4}, {:.4} · {}",
            snapshot.location.latitude, snapshot.location.longitude, snapshot.location.timezone
        ))
    );

    Ok(())
}

pub async fn forecast(api_url: &Option<String>, place: &str, days: Option<u8>) -> Result<()> {
    let client = open_client(api_url)?;
    let resolved = resolve_place(&client, place).await?;
    let snapshot = client
        .forecast(resolved.latitude, resolved.longitude, days)
        .await?;

    Logger::header(format!("Forecast for {}", place_label(&resolved)));
    print_daily_table(&snapshot);
    Ok(())
}

fn print_daily_table(snapshot: &WeatherSnapshot) {
    let Some(daily) = &snapshot.daily else {
        Logger::warn("No daily forecast in the response.");
        return;
    };

    let unit = unit_symbol(&snapshot.temperature_unit);

    let mut table = Table::new();
    table.set_header(vec!["Date", "Conditions", "High", "Low", "Rain", "UV", "Sunrise", "Sunset"]);

    for (i, day) in daily.time.iter().enumerate() {
        let condition = daily
            .conditions
            .get(i)
            .map(|c| format!("{} {}", c.icon, c.description))
            .unwrap_or_default();
        table.add_row(vec![
            day.format("%a %d %b").to_string(),
            condition,
            daily
                .temperature_max
                .get(i)
                .map(|t| format!("{t:.0}{unit}"))
                .unwrap_or_default(),
            daily
                .temperature_min
                .get(i)
                .map(|t| format!("{t:.0}{unit}"))
                .unwrap_or_default(),
            daily
                .precipitation_sum
                .get(i)
                .map(|p| format!("{p:.1} mm"))
                .unwrap_or_default(),
            daily
                .uv_index_max
                .get(i)
                .map(|u| format!("{u:.1}"))
                .unwrap_or_default(),
            daily
                .sunrise
                .get(i)
                .map(|s| s.format("%H:%M").to_string())
                .unwrap_or_default(),
            daily
                .sunset
                .get(i)
                .map(|s| s.format("%H:%M").to_string())
                .unwrap_or_default(),
        ]);
    }

    println!("{table}");
}

pub async fn search(api_url: &Option<String>, query: &str) -> Result<()> {
    let client = open_client(api_url)?;
    let results = client.search(query).await?;

    if results.is_empty() {
        Logger::warn(format!("No locations found for '{query}'"));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Region", "Country", "Latitude", "Longitude"]);
    for result in &results {
        table.add_row(vec![
            result.name.clone(),
            result.admin1.clone(),
            result.country.clone(),
            format!("{:.4}", result.latitude),
            format!("{:.4}", result.longitude),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn print_favorites(favorites: &[FavoriteLocation]) {
    let mut table = Table::new();
    table.set_header(vec!["Name", "Latitude", "Longitude"]);
    for favorite in favorites {
        table.add_row(vec![
            favorite.name.clone(),
            format!("{:.4}", favorite.latitude),
            format!("{:.4}", favorite.longitude),
        ]);
    }
    println!("{table}");
}

pub async fn favorites_list(api_url: &Option<String>) -> Result<()> {
    let client = signed_in_client(api_url)?;
    let data = client.profile().await?;

    if data.user.favorite_locations.is_empty() {
        Logger::info("No favorite locations saved yet. Add one with `skycast favorites add <place>`.");
    } else {
        print_favorites(&data.user.favorite_locations);
    }
    Ok(())
}

pub async fn favorites_add(api_url: &Option<String>, place: &str) -> Result<()> {
    let client = signed_in_client(api_url)?;
    let resolved = resolve_place(&client, place).await?;

    let mut favorites = client.profile().await?.user.favorite_locations;
    if favorites
        .iter()
        .any(|f| f.name.eq_ignore_ascii_case(&resolved.name))
    {
        Logger::warn(format!("'{}' is already saved.", resolved.name));
        return Ok(());
    }

    favorites.push(FavoriteLocation {
        name: resolved.name.clone(),
        latitude: resolved.latitude,
        longitude: resolved.longitude,
    });

    let updated = client.update_locations(&favorites).await?;
    Logger::success(format!(
        "Saved {} ({} location{} total)",
        Logger::highlight(&resolved.name),
        updated.favorite_locations.len(),
        if updated.favorite_locations.len() == 1 { "" } else { "s" }
    ));
    Ok(())
}

pub async fn favorites_remove(api_url: &Option<String>, name: &str) -> Result<()> {
    let client = signed_in_client(api_url)?;
    let favorites = client.profile().await?.user.favorite_locations;

    let remaining: Vec<FavoriteLocation> = favorites
        .iter()
        .filter(|f| !f.name.eq_ignore_ascii_case(name))
        .cloned()
        .collect();

    if remaining.len() == favorites.len() {
        Logger::warn(format!("No favorite named '{name}'."));
        return Ok(());
    }

    client.update_locations(&remaining).await?;
    Logger::success(format!("Removed '{name}' from favorites."));
    Ok(())
}

pub async fn delete_account(api_url: &Option<String>) -> Result<()> {
    let confirmed = Confirm::new("This permanently deletes your account and favorites. Continue?")
        .with_default(false)
        .prompt()?;
    if !confirmed {
        Logger::info("Aborted.");
        return Ok(());
    }

    let client = signed_in_client(api_url)?;
    client.delete_account().await?;
    AuthConfig::logout()?;
    Logger::success("Account deleted.");
    Ok(())
}
