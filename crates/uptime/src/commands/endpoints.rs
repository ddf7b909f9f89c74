//! Endpoint command handlers.

use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;
use uptime_core::{
    Analytics, CreateEndpointRequest, Dashboard, Endpoint, EndpointListParams, HttpMethod,
    UpdateEndpointRequest, queries,
};

use crate::cli::{EndpointFields, EndpointsArgs, EndpointsCommand, GlobalOpts};
use crate::error::CliError;
use crate::{format, output};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Expect")]
    expected: u16,
    #[tabled(rename = "Every")]
    interval: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl EndpointRow {
    fn new(e: &Endpoint, color: bool) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            method: e.method.to_string(),
            url: e.url.clone(),
            expected: e.expected_status,
            interval: format::check_interval(e.check_interval),
            status: active_label(e.is_active, color),
        }
    }
}

fn active_label(active: bool, color: bool) -> String {
    output::paint_status(if active { "Active" } else { "Paused" }, active, color)
}

/// Endpoint plus its analytics window, as printed by `endpoints get`.
#[derive(Serialize)]
struct EndpointReport<'a> {
    endpoint: &'a Endpoint,
    analytics: &'a Analytics,
}

fn detail(r: &EndpointReport<'_>, color: bool) -> String {
    let e = r.endpoint;
    let a = r.analytics;
    let mut lines = vec![
        format!("ID:            {}", e.id),
        format!("Name:          {}", e.name),
        format!("URL:           {} {}", e.method, e.url),
        format!("Expected:      {}", e.expected_status),
        format!("Check every:   {}", format::check_interval(e.check_interval)),
        format!("Status:        {}", active_label(e.is_active, color)),
        format!("Created:       {}", format::timestamp(&e.created_at)),
        format!("Updated:       {}", format::timestamp(&e.updated_at)),
    ];
    if let Some(ref headers) = e.headers {
        let mut names: Vec<_> = headers.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("Header:        {name}: {}", headers[name]));
        }
    }
    lines.push(String::new());
    lines.push(format!("Window:        {}", a.time_range));
    lines.push(format!("Uptime:        {}", format::uptime(a.uptime_percentage)));
    lines.push(format!(
        "Checks:        {} total, {} ok, {} failed",
        a.total_checks, a.successful_checks, a.failed_checks
    ));
    lines.push(format!(
        "Avg response:  {}",
        format::response_time(Some(a.average_response_time))
    ));
    if let Some(status) = a.last_check_status {
        let up = status == uptime_core::CheckStatus::Up;
        lines.push(format!(
            "Last check:    {}",
            output::paint_status(&status.to_string(), up, color)
        ));
    }
    lines.join("\n")
}

// ── Request builders ────────────────────────────────────────────────

fn parse_method(raw: Option<&str>) -> Result<Option<HttpMethod>, CliError> {
    raw.map(|m| {
        HttpMethod::from_str(m).map_err(|_| CliError::Validation {
            field: "method".into(),
            reason: format!("expected GET, POST, PUT, DELETE or PATCH, got '{m}'"),
        })
    })
    .transpose()
}

fn create_request(fields: EndpointFields) -> Result<CreateEndpointRequest, CliError> {
    Ok(CreateEndpointRequest {
        method: parse_method(fields.method.as_deref())?,
        headers: util::parse_headers(&fields.headers)?,
        name: fields.name.unwrap_or_default(),
        url: fields.url.unwrap_or_default(),
        expected_status: fields.expected_status,
        check_interval: fields.interval,
    })
}

fn update_request(fields: EndpointFields) -> Result<UpdateEndpointRequest, CliError> {
    Ok(UpdateEndpointRequest {
        method: parse_method(fields.method.as_deref())?,
        headers: util::parse_headers(&fields.headers)?,
        name: fields.name,
        url: fields.url,
        expected_status: fields.expected_status,
        check_interval: fields.interval,
        is_active: None,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: EndpointsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());
    let format = global.format();

    match args.command {
        EndpointsCommand::List { page, search } => {
            let params = EndpointListParams {
                limit: Some(page.limit.unwrap_or(dashboard.config().pagination.default_limit)),
                offset: Some(page.offset),
                endpoint_name: search
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty()),
            };
            let endpoints = queries::endpoint_list(dashboard.client(), params)
                .fetch(dashboard.cache())
                .await?;
            let out = output::render_list(
                &format,
                &endpoints,
                |e| EndpointRow::new(e, color),
                |e| e.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EndpointsCommand::Get { id, hours } => {
            let range = util::time_range(hours)?;
            let (endpoint, analytics) = tokio::try_join!(
                queries::endpoint(dashboard.client(), &id).fetch(dashboard.cache()),
                queries::endpoint_analytics(dashboard.client(), &id, range)
                    .fetch(dashboard.cache()),
            )?;
            let report = EndpointReport {
                endpoint: &endpoint,
                analytics: &analytics,
            };
            let out = output::render_single(
                &format,
                &report,
                |r| detail(r, color),
                |r| r.endpoint.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EndpointsCommand::Create { fields } => {
            let created = dashboard
                .mutations()
                .create_endpoint(create_request(fields)?)
                .await?;
            if !global.quiet {
                eprintln!("Endpoint created");
            }
            print_endpoint(&created, global, color);
            Ok(())
        }

        EndpointsCommand::Update { id, fields } => {
            let updated = dashboard
                .mutations()
                .update_endpoint(&id, update_request(fields)?)
                .await?;
            if !global.quiet {
                eprintln!("Endpoint updated");
            }
            print_endpoint(&updated, global, color);
            Ok(())
        }

        EndpointsCommand::Enable { id } => set_active(dashboard, &id, true, global).await,
        EndpointsCommand::Disable { id } => set_active(dashboard, &id, false, global).await,

        EndpointsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Stop monitoring endpoint {id}?"),
                "endpoints delete",
                global.yes,
            )? {
                return Ok(());
            }
            dashboard.mutations().delete_endpoint(&id).await?;
            if !global.quiet {
                eprintln!("Endpoint deleted");
            }
            Ok(())
        }
    }
}

async fn set_active(
    dashboard: &Dashboard,
    id: &str,
    active: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let endpoint = dashboard.mutations().set_endpoint_active(id, active).await?;
    if !global.quiet {
        eprintln!(
            "Endpoint {} {}",
            endpoint.name,
            if endpoint.is_active { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}

fn print_endpoint(endpoint: &Endpoint, global: &GlobalOpts, color: bool) {
    let out = output::render_list(
        &global.format(),
        std::slice::from_ref(endpoint),
        |e| EndpointRow::new(e, color),
        |e| e.id.clone(),
    );
    output::print_output(&out, global.quiet);
}
