//! The interactive hire → push → review loop.

use std::io::{BufRead, Write};
use std::sync::LazyLock;

use anyhow::Result;
use crossterm::style::Stylize;
use regex::Regex;
use workplace::core::types::SecurityStatus;

use crate::api::WorkplaceApi;

static REPO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+").expect("repo url regex")
});

/// First repository URL mentioned in `text`, without trailing punctuation.
pub fn extract_repo_url(text: &str) -> Option<String> {
    REPO_URL_RE
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

/// Run simulations until the user declines another one or input ends.
pub fn run<A, R, W>(api: &A, input: &mut R, out: &mut W) -> Result<()>
where
    A: WorkplaceApi + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out, "{}", "=== WELCOME TO SHADOW WORKPLACE ===".bold().cyan())?;
        let Some(role) = ask(input, out, "What job role do you want to simulate? ")? else {
            return Ok(());
        };

        if let Some(repo_url) = get_hired(api, input, out, &role)? {
            get_reviewed(api, input, out, &repo_url)?;
        }

        if ask_yes_no(input, out, "Run another simulation? [y/n] ")? != Some(true) {
            return Ok(());
        }
    }
}

fn get_hired<A, R, W>(api: &A, input: &mut R, out: &mut W, role: &str) -> Result<Option<String>>
where
    A: WorkplaceApi + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", "Manager is negotiating with DevOps...".yellow())?;
    let state = match api.start_job(role) {
        Ok(state) => state,
        Err(err) => {
            writeln!(out, "{} {err:#}", "Error connecting to server:".red().bold())?;
            return Ok(None);
        }
    };

    let offer = state.last_message().unwrap_or("No response");
    writeln!(out, "\n{}\n{offer}\n", "Job Offer".green().bold())?;

    if let Some(url) = extract_repo_url(offer) {
        return Ok(Some(url));
    }
    let pasted = ask(
        input,
        out,
        "No repository link in the offer. Paste a repository URL (blank to skip): ",
    )?;
    Ok(pasted.filter(|url| !url.is_empty()))
}

fn get_reviewed<A, R, W>(api: &A, input: &mut R, out: &mut W, repo_url: &str) -> Result<()>
where
    A: WorkplaceApi + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", "Phase 2: The Review".bold())?;
    writeln!(out, "Target repo: {}", repo_url.underlined().blue())?;
    if ask(input, out, "Press ENTER when you have pushed your code... ")?.is_none() {
        return Ok(());
    }

    writeln!(out, "{}", "Senior engineer is reviewing your push...".yellow())?;
    let state = match api.review_code(repo_url) {
        Ok(state) => state,
        Err(err) => {
            writeln!(out, "{} {err:#}", "Error:".red().bold())?;
            return Ok(());
        }
    };

    let verdict = match state.security_status {
        SecurityStatus::Clean => "CLEAN".green().bold(),
        SecurityStatus::Blocked => "BLOCKED".red().bold(),
    };
    writeln!(out, "\nVerdict: {verdict}")?;
    writeln!(
        out,
        "{}\n{}\n",
        "Code Review".bold(),
        state.last_message().unwrap_or("No feedback")
    )?;
    Ok(())
}

/// Prompt and read one trimmed line; `None` at end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{}", prompt.green())?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> Result<Option<bool>> {
    loop {
        let Some(answer) = ask(input, out, prompt)? else {
            return Ok(None);
        };
        match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(Some(true)),
            "n" | "no" => return Ok(Some(false)),
            _ => writeln!(out, "Please answer y or n.")?,
        }
    }
}
