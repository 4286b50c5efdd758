use anyhow::{Context, Result};
use calsync_core::Rule;
use calsync_core::rule::build_rules;

use crate::config::Config;

pub fn run(cfg: &Config) -> Result<()> {
    let rules = build_rules(&cfg.rules).context("Invalid rule in config")?;

    if rules.is_empty() {
        println!("No rules configured.");
        return Ok(());
    }

    for (i, rule) in rules.iter().enumerate() {
        println!("{}", describe(i + 1, rule));
    }
    println!("\n{} rule(s) OK", rules.len());

    Ok(())
}

fn describe(index: usize, rule: &Rule) -> String {
    let mut line = format!(
        "{}. {} (window -{}s/+{}s",
        index,
        rule,
        rule.window.look_back.num_seconds(),
        rule.window.look_forward.num_seconds()
    );
    if rule.filter.is_some() {
        line.push_str(", filtered");
    }
    if !rule.transforms.is_empty() {
        line.push_str(&format!(", {} transform(s)", rule.transforms.len()));
    }
    if !rule.private_copy {
        line.push_str(", public copies");
    }
    line.push(')');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::{Filter, RuleMethod, Transform};

    #[test]
    fn test_describe_default_rule() {
        let rule = Rule::new(RuleMethod::Copy, "Work", "Personal");
        assert_eq!(
            describe(1, &rule),
            "1. copy [Work] -> Personal (window -604800s/+7257600s)"
        );
    }

    #[test]
    fn test_describe_full_rule() {
        let mut rule = Rule::new(RuleMethod::RemoveDeleted, "Work", "Personal");
        rule.filter = Some(Filter::AllDayEvent(false));
        rule.transforms = vec![Transform::DescriptionAppend("x".into())];
        rule.private_copy = false;
        assert!(describe(2, &rule).ends_with(", filtered, 1 transform(s), public copies)"));
    }
}
