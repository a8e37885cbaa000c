use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use pesa_core::{Budget, Transaction, UserProfile};

pub fn pesa_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pesa"))
}

pub fn ensure_pesa_home() -> Result<PathBuf> {
    let dir = pesa_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn transactions_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("transactions.json"))
}

pub fn budgets_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("budgets.json"))
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("profile.json"))
}

pub fn loyalty_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("loyalty.json"))
}

fn read_json_or<T: DeserializeOwned>(path: &PathBuf, default: T) -> Result<T> {
    if !path.exists() {
        return Ok(default);
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?)
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn read_transactions() -> Result<Vec<Transaction>> {
    read_json_or(&transactions_path()?, Vec::new())
}

pub fn write_transactions(txns: &[Transaction]) -> Result<()> {
    write_json(&transactions_path()?, &txns)
}

pub fn read_budgets() -> Result<Vec<Budget>> {
    read_json_or(&budgets_path()?, Vec::new())
}

pub fn write_budgets(budgets: &[Budget]) -> Result<()> {
    write_json(&budgets_path()?, &budgets)
}

pub fn read_profile() -> Result<UserProfile> {
    read_json_or(&profile_path()?, UserProfile::default())
}

pub fn write_profile(profile: &UserProfile) -> Result<()> {
    write_json(&profile_path()?, profile)
}

/// Latest known loyalty-points balance per account
pub fn read_loyalty() -> Result<HashMap<String, i64>> {
    read_json_or(&loyalty_path()?, HashMap::new())
}

pub fn write_loyalty(balances: &HashMap<String, i64>) -> Result<()> {
    write_json(&loyalty_path()?, balances)
}
