use std::io::{self, Write};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context as _, Result};
use tracing::warn;

use tourni_core::auth::{validate_login, validate_signup, CredentialStore, SessionState};
use tourni_core::models::{AddMatchResultRequest, LoginRequest, MatchResultStatus, SignupRequest};
use tourni_core::nav::{guard, GuardDecision, HeaderControl, Shell};
use tourni_core::{ApiClient, ApiError, AuthService, Config, FileStorage, PersistedStore, Route};

/// Everything a command needs: config, the auth service and its client.
pub struct Context {
    config: Config,
    auth: AuthService<ApiClient, FileStorage>,
}

impl Context {
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let mut config = Config::load().context("Failed to load config")?;
        if base_url.is_some() {
            config.base_url = base_url;
        }

        let data_dir = Config::data_dir()?;
        let store = PersistedStore::new(FileStorage::in_dir(&data_dir));
        let state = SessionState::hydrate(store);

        let client = ApiClient::new(config.resolved_base_url(), config.timeout())
            .context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            auth: AuthService::new(client, state),
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.resolved_base_url()
    }

    /// Client carrying the session's bearer token, if any.
    fn client(&self) -> ApiClient {
        match self.auth.session().bearer() {
            Some(token) => self.auth.backend().with_token(token.to_string()),
            None => self.auth.backend().clone(),
        }
    }

    pub async fn login(&mut self, username: Option<String>, remember: bool) -> Result<()> {
        let username = match username.or_else(|| self.config.default_username()) {
            Some(name) => name,
            None => prompt_line("Username: ")?,
        };
        let remembered = Config::env_password().or_else(|| CredentialStore::get_password(&username));
        let password = match remembered {
            Some(password) => password,
            None => rpassword::prompt_password("Password: ")?,
        };

        let credentials = LoginRequest::new(username.trim(), password);
        validate_login(&credentials)?;

        self.auth.login(&credentials).await?;

        if remember {
            if let Err(e) = CredentialStore::store(&credentials.username, &credentials.password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }
        self.config.last_username = Some(credentials.username.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.whoami();
        Ok(())
    }

    pub async fn signup(
        &mut self,
        first_name: String,
        last_name: String,
        username: String,
        email: String,
    ) -> Result<()> {
        let password = rpassword::prompt_password("Password: ")?;
        let confirm_password = rpassword::prompt_password("Confirm password: ")?;
        let data = SignupRequest {
            first_name,
            last_name,
            username,
            email,
            password,
            confirm_password,
        };
        validate_signup(&data)?;

        self.auth.signup(&data).await?;
        println!("Account created.");
        self.whoami();
        Ok(())
    }

    pub fn logout(&mut self, forget: bool) -> Result<()> {
        let user_name = self.auth.session().user_name.clone();
        self.auth.logout();
        if forget && !user_name.is_empty() {
            CredentialStore::delete(&user_name).context("Failed to remove remembered password")?;
        }
        println!("Signed out.");
        Ok(())
    }

    pub fn whoami(&self) {
        let shell = Shell::from_session(self.auth.session());
        let header: Vec<String> = shell.header.iter().map(HeaderControl::label).collect();
        println!("{}", header.join("  |  "));
        if !self.auth.session().roles.is_empty() {
            println!("Roles: {}", self.auth.session().roles);
        }
        println!();
        for link in &shell.sidebar {
            let usage = command_for(link.route).unwrap_or("(not available from the command line)");
            println!("  {:<18} {}", link.label, usage);
        }
    }

    pub async fn tournaments(&self) -> Result<()> {
        let tournaments = self.client().fetch_tournaments().await.map_err(explain)?;
        if tournaments.is_empty() {
            println!("No tournaments yet.");
        }
        for t in tournaments {
            println!("{:>5}  {}", t.tournament_id, t.tournament_name);
        }
        Ok(())
    }

    pub async fn teams(&self) -> Result<()> {
        let teams = self.client().fetch_teams().await.map_err(explain)?;
        if teams.is_empty() {
            println!("No teams yet.");
        }
        for t in teams {
            println!("{:>5}  {}", t.team_id, t.team_name);
        }
        Ok(())
    }

    pub async fn points_table(&self, tournament_id: i64) -> Result<()> {
        let table = self
            .client()
            .fetch_points_table(tournament_id)
            .await
            .map_err(explain)?;
        if table.is_empty() {
            println!("No results recorded for tournament {tournament_id}.");
            return Ok(());
        }

        println!(
            "{:<4}{:<24}{:>4}{:>4}{:>4}{:>4}{:>4}{:>6}{:>9}",
            "#", "Team", "P", "W", "L", "T", "NR", "Pts", "NRR"
        );
        for (pos, row) in table.standings().into_iter().enumerate() {
            println!(
                "{:<4}{:<24}{:>4}{:>4}{:>4}{:>4}{:>4}{:>6}{:>9.3}",
                pos + 1,
                row.team_name,
                row.played,
                row.won,
                row.lost,
                row.tied,
                row.no_result,
                row.points,
                row.net_match_rate
            );
        }
        Ok(())
    }

    pub async fn add_match_result(&self, request: AddMatchResultRequest) -> Result<()> {
        let route = Route::AddMatchResult;
        if let GuardDecision::Redirect { to, .. } = guard(self.auth.session(), route) {
            bail!(
                "{} requires an admin account. Go to {} (`tourni login`) first.",
                route.title(),
                to.title()
            );
        }
        request.validate()?;

        let client = self.client();
        let (teams, tournaments) =
            futures::future::try_join(client.fetch_teams(), client.fetch_tournaments())
                .await
                .map_err(explain)?;

        let team_name = |id: i64| {
            teams
                .iter()
                .find(|t| t.team_id == id)
                .map(|t| t.team_name.clone())
                .ok_or_else(|| anyhow!("Unknown team id {id}"))
        };
        let one = team_name(request.team_one_id)?;
        let two = team_name(request.team_two_id)?;
        let tournament = tournaments
            .iter()
            .find(|t| t.tournament_id == request.tournament_id)
            .ok_or_else(|| anyhow!("Unknown tournament id {}", request.tournament_id))?;

        let message = client.add_match_result(&request).await.map_err(explain)?;
        println!(
            "{}: match {} {} vs {} ({})",
            tournament.tournament_name, request.match_number, one, two, request.match_result_status
        );
        if !message.is_empty() {
            println!("{message}");
        }
        Ok(())
    }
}

/// The subcommand that opens `route`, if the CLI has one.
fn command_for(route: Route) -> Option<&'static str> {
    match route {
        Route::PointsTable => Some("tourni points-table <TOURNAMENT_ID>"),
        Route::AddMatchResult => Some("tourni add-match-result --tournament <ID> --match <N> ..."),
        Route::Login => Some("tourni login"),
        Route::Signup => Some("tourni signup"),
        Route::Home | Route::AddTournament | Route::AddTeam => None,
    }
}

/// Build a match result from command-line values. Pairs are `a:b`, team one
/// first.
pub fn match_result_request(
    tournament_id: i64,
    match_number: u32,
    (team_one_id, team_two_id): (i64, i64),
    status: &str,
    winner: Option<i64>,
    (score, wickets, overs): (&str, &str, &str),
) -> Result<AddMatchResultRequest> {
    let match_result_status = MatchResultStatus::parse(status)
        .ok_or_else(|| anyhow!("Unknown status '{status}'; use COMPLETED, TIED or NO_RESULT"))?;

    let loser = winner.map(|w| if w == team_one_id { team_two_id } else { team_one_id });

    let (team_one_score, team_two_score) = parse_pair::<u32>(score).context("Invalid --score")?;
    let (team_one_wickets, team_two_wickets) =
        parse_pair::<u32>(wickets).context("Invalid --wickets")?;
    let (team_one_overs_played, team_two_overs_played) =
        parse_pair::<f64>(overs).context("Invalid --overs")?;

    Ok(AddMatchResultRequest {
        match_number,
        tournament_id,
        winner_team_id: winner,
        loser_team_id: loser,
        team_one_id,
        team_two_id,
        team_one_score,
        team_two_score,
        team_one_wickets,
        team_two_wickets,
        team_one_overs_played,
        team_two_overs_played,
        match_result_status,
    })
}

fn parse_pair<T>(raw: &str) -> Result<(T, T)>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let (a, b) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("expected two values as a:b, got '{raw}'"))?;
    Ok((a.trim().parse()?, b.trim().parse()?))
}

/// Add a hint to errors the user can act on.
fn explain(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Unauthorized | ApiError::AccessDenied(_) => {
            anyhow!("{err}. Run `tourni login` with an account that has access.")
        }
        other => other.into(),
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
