//! Column classification
//!
//! Source exports name their columns inconsistently and in two languages.
//! Each label is run through an ordered list of rules and takes the role of
//! the first rule that accepts it. New locales are new keywords, not new
//! control flow.

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{ColumnAssignment, ColumnMapping, ColumnRole, MetricVariant};

/// A keyword rule assigning one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub role: ColumnRole,
    /// Label must contain at least one of these
    pub include: Vec<String>,
    /// Label must contain none of these
    pub exclude: Vec<String>,
    /// Labels accepted verbatim regardless of the lists above
    pub exact: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl ClassificationRule {
    pub fn new(role: ColumnRole, include: &[&str], exclude: &[&str], exact: &[&str]) -> Self {
        Self {
            role,
            include: owned(include),
            exclude: owned(exclude),
            exact: owned(exact),
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        if self.exact.iter().any(|e| e == label) {
            return true;
        }
        self.include.iter().any(|k| label.contains(k.as_str()))
            && !self.exclude.iter().any(|k| label.contains(k.as_str()))
    }

    /// Whether the label is exactly one of this rule's keywords
    pub fn is_exact(&self, label: &str) -> bool {
        self.exact.iter().chain(self.include.iter()).any(|k| k == label)
    }
}

fn date_rule() -> ClassificationRule {
    ClassificationRule::new(ColumnRole::Date, &["日期", "Date", "Day"], &[], &[])
}

fn campaign_rule() -> ClassificationRule {
    ClassificationRule::new(
        ColumnRole::CampaignName,
        &["广告名称", "Campaign", "广告计划", "广告系列"],
        &[],
        &["Campaign Name", "Campaign"],
    )
}

fn installs_rule() -> ClassificationRule {
    ClassificationRule::new(
        ColumnRole::Installs,
        &["下载", "Installs", "Downloads", "安装", "Conversions"],
        &["率", "Rate", "转化", "Cost", "CPI"],
        &[],
    )
}

fn spend_rule() -> ClassificationRule {
    ClassificationRule::new(
        ColumnRole::Spend,
        &["花费", "Spend", "Cost"],
        &["每日", "Budget", "Avg", "avg", "Local", "CPM", "CPT", "CPA"],
        &[],
    )
}

fn cpi_rule() -> ClassificationRule {
    ClassificationRule::new(
        ColumnRole::Cpi,
        &["CPI", "CPA"],
        &[],
        &["CPI", "CPA", "Avg CPA", "平均CPI", "平均CPA"],
    )
}

/// How one source label was classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDiagnosis {
    pub index: usize,
    pub label: String,
    pub role: ColumnRole,
    /// Chosen as the single column for its role
    pub selected: bool,
}

/// Ordered rule list for one source variant
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    variant: MetricVariant,
    rules: Vec<ClassificationRule>,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::for_variant(MetricVariant::Spend)
    }
}

impl ColumnClassifier {
    /// Built-in rules, in priority order
    pub fn for_variant(variant: MetricVariant) -> Self {
        let cost_rule = match variant {
            MetricVariant::Spend => spend_rule(),
            MetricVariant::Cpi => cpi_rule(),
        };
        Self {
            variant,
            rules: vec![date_rule(), campaign_rule(), installs_rule(), cost_rule],
        }
    }

    pub fn variant(&self) -> MetricVariant {
        self.variant
    }

    /// Append include keywords to the rule for `role`, if this variant has one
    pub fn with_keywords<S: AsRef<str>>(mut self, role: ColumnRole, keywords: &[S]) -> Self {
        if let Some(rule) = self.rules.iter_mut().find(|r| r.role == role) {
            rule.include
                .extend(keywords.iter().map(|k| k.as_ref().to_string()));
        }
        self
    }

    /// Role of the first rule accepting the label
    pub fn classify(&self, label: &str) -> ColumnRole {
        self.rules
            .iter()
            .find(|r| r.matches(label))
            .map(|r| r.role)
            .unwrap_or(ColumnRole::Unmapped)
    }

    fn rule_for(&self, role: ColumnRole) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.role == role)
    }

    /// Pick one column per role
    ///
    /// Among several candidates an exact keyword match wins, then the
    /// shortest label, then the earliest column.
    fn select(&self, labels: &[String]) -> Vec<ColumnAssignment> {
        let roles: Vec<ColumnRole> = labels.iter().map(|l| self.classify(l)).collect();

        let mut selected = Vec::new();
        for rule in &self.rules {
            if selected.iter().any(|a: &ColumnAssignment| a.role == rule.role) {
                continue;
            }
            let winner = labels
                .iter()
                .enumerate()
                .filter(|(i, _)| roles[*i] == rule.role)
                .min_by_key(|(i, label)| {
                    let exact = self
                        .rule_for(rule.role)
                        .map(|r| r.is_exact(label))
                        .unwrap_or(false);
                    (!exact, label.chars().count(), *i)
                });
            if let Some((index, label)) = winner {
                selected.push(ColumnAssignment {
                    role: rule.role,
                    index,
                    label: label.clone(),
                });
            }
        }
        selected
    }

    /// Map trimmed labels onto canonical roles
    ///
    /// Fails with `MissingColumns` naming every required role that has no
    /// candidate. Unmatched labels are left out of the mapping.
    pub fn resolve(&self, labels: &[String]) -> Result<ColumnMapping> {
        let selected = self.select(labels);

        let missing: Vec<ColumnRole> = self
            .variant
            .required_roles()
            .into_iter()
            .filter(|role| !selected.iter().any(|a| a.role == *role))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns {
                missing,
                detected: labels.to_vec(),
            });
        }

        Ok(ColumnMapping::new(selected))
    }

    /// Per-label classification report
    pub fn diagnose(&self, labels: &[String]) -> Vec<ColumnDiagnosis> {
        let selected = self.select(labels);
        labels
            .iter()
            .enumerate()
            .map(|(index, label)| ColumnDiagnosis {
                index,
                label: label.clone(),
                role: self.classify(label),
                selected: selected.iter().any(|a| a.index == index),
            })
            .collect()
    }
}
