//! Server-rendered HTML pages

use std::fmt::Write;

use axum::http::StatusCode;

use super::utils::escape_html;
use crate::config::FormDefaults;
use crate::pipeline::RunReport;
use crate::search::Quality;

const TITLE: &str = "Pixabay Video Downloader";

fn layout(body: &str) -> String {
    titled_layout(TITLE, body)
}

fn titled_layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{TITLE}</h1>\n{body}</body>\n</html>\n"
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(error));
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\n\
         <label>Access key <input type=\"password\" name=\"access_key\" autofocus></label>\n\
         <button type=\"submit\">Login</button>\n\
         </form>\n",
    );
    layout(&body)
}

pub fn search_page(defaults: &FormDefaults) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/runs\">\n");

    let _ = writeln!(
        body,
        "<label>Search keyword <input type=\"text\" name=\"keyword\" value=\"{}\"></label>",
        escape_html(&defaults.keyword)
    );
    let _ = writeln!(
        body,
        "<label>Minimum duration (seconds) <input type=\"number\" name=\"min_duration\" min=\"1\" value=\"{}\"></label>",
        defaults.min_duration
    );
    let _ = writeln!(
        body,
        "<label>Maximum duration (seconds) <input type=\"number\" name=\"max_duration\" min=\"1\" value=\"{}\"></label>",
        defaults.max_duration
    );

    body.push_str("<label>Video quality <select name=\"quality\">\n");
    for quality in Quality::ALL {
        let selected = if quality == defaults.quality { " selected" } else { "" };
        let _ = writeln!(body, "<option value=\"{quality}\"{selected}>{quality}</option>");
    }
    body.push_str("</select></label>\n");

    body.push_str("<label>Number of videos <select name=\"count\">\n");
    for n in 1..=defaults.max_count {
        let selected = if n == defaults.count { " selected" } else { "" };
        let _ = writeln!(body, "<option value=\"{n}\"{selected}>{n}</option>");
    }
    body.push_str("</select></label>\n");

    body.push_str("<button type=\"submit\">Search and Download</button>\n</form>\n");
    body.push_str(
        "<form method=\"post\" action=\"/logout\"><button type=\"submit\">Logout</button></form>\n",
    );

    layout(&body)
}

/// Summary of a finished run. `archive_link` is set when a bundle is waiting.
pub fn result_page(report: &RunReport, archive_link: Option<&str>) -> String {
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<p>Searched \"{}\" ({}): {} hits over {} page(s), {} selected.</p>",
        escape_html(&report.keyword),
        report.quality,
        report.hits_received,
        report.pages_requested,
        report.selected
    );

    if let Some(warning) = report.warning {
        let _ = writeln!(body, "<p class=\"warning\">{}</p>", escape_html(&warning.to_string()));
    }

    if !report.failures.is_empty() {
        body.push_str("<ul class=\"failures\">\n");
        for failure in &report.failures {
            let _ = writeln!(
                body,
                "<li>Error downloading {}: {}</li>",
                escape_html(&failure.file_name),
                escape_html(&failure.message)
            );
        }
        body.push_str("</ul>\n");
    }

    if let Some(link) = archive_link {
        let _ = writeln!(
            body,
            "<p class=\"success\">Successfully downloaded {} video(s).</p>",
            report.entries.len()
        );
        body.push_str("<ul class=\"entries\">\n");
        for entry in &report.entries {
            let _ = writeln!(body, "<li>{}</li>", escape_html(entry));
        }
        body.push_str("</ul>\n");
        let _ = writeln!(
            body,
            "<p><a href=\"{}\" download>Download ZIP file</a></p>",
            escape_html(link)
        );
    }

    body.push_str("<p><a href=\"/\">New search</a></p>\n");
    layout(&body)
}

pub fn error_page(status: StatusCode, code: &str, message: &str) -> String {
    let body = format!(
        "<p class=\"error\" data-code=\"{}\">{}</p>\n<p><a href=\"/\">Back</a></p>\n",
        escape_html(code),
        escape_html(message)
    );
    titled_layout(&format!("{TITLE} - {}", status.as_u16()), &body)
}
