//! Tokenising and attribute extraction for raw commands

use regex::Regex;
use serde_json::Value;

use crate::core::TargetCollection;

pub const USER_TOKENS: &[&str] = &["user", "users"];
pub const PROJECT_TOKENS: &[&str] = &["project", "projects"];
pub const ALL_TOKENS: &[&str] = &["all", "every"];
pub const DEPARTMENTS: &[&str] = &["engineering", "marketing", "sales", "general"];
pub const STATUSES: &[&str] = &["active", "completed", "planning", "on-hold"];

/// Words that end a free-text attribute such as a name
const STOP_WORDS: &str = "in|with|as|for|and|managed|budget|email|status|department|at";

/// Fields an update command may assign
const ASSIGNABLE_FIELDS: &str = "name|email|department|status|budget|manager";

/// Collection words as a regex alternation
const COLLECTION_WORDS: &str = "users?|projects?";

/// Triggers that are not verbs and only match as written ("news" is not "new")
const UNINFLECTED: &[&str] = &["new"];

/// True when `token` is `verb` or a regular inflection of it
///
/// Covers "lists", "listing", "updated", "getting", "modifies".
pub fn is_form_of(token: &str, verb: &str) -> bool {
    if token == verb {
        return true;
    }
    if UNINFLECTED.contains(&verb) || token.len() <= verb.len() {
        return false;
    }

    let mut stems = vec![verb.to_string()];
    if let Some(stem) = verb.strip_suffix('e') {
        stems.push(stem.to_string());
    }
    if let Some(stem) = verb.strip_suffix('y') {
        stems.push(format!("{}i", stem));
    }
    if let Some(last) = verb.chars().last() {
        stems.push(format!("{}{}", verb, last));
    }

    stems.iter().any(|stem| {
        token
            .strip_prefix(stem.as_str())
            .is_some_and(|suffix| matches!(suffix, "s" | "es" | "d" | "ed" | "ing"))
    })
}

/// A raw command split into lowercase word tokens
///
/// Word boundaries are anything other than alphanumerics and `@ . - _`, so
/// email addresses and hyphenated statuses survive as single tokens.
#[derive(Debug, Clone)]
pub struct CommandText<'a> {
    raw: &'a str,
    tokens: Vec<String>,
}

impl<'a> CommandText<'a> {
    pub fn new(raw: &'a str) -> Self {
        let tokens = raw
            .split(|c: char| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '-' | '_')))
            .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '-' | '_')))
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { raw, tokens }
    }

    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn has(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }

    pub fn has_any(&self, words: &[&str]) -> bool {
        self.tokens.iter().any(|t| words.contains(&t.as_str()))
    }

    /// Like `has_any`, but also accepts inflected verbs ("listing" for "list")
    pub fn has_any_form(&self, verbs: &[&str]) -> bool {
        self.tokens
            .iter()
            .any(|t| verbs.iter().any(|verb| is_form_of(t, verb)))
    }

    /// First token, in command order, that belongs to `words`
    pub fn find_any(&self, words: &[&str]) -> Option<&str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .find(|t| words.contains(t))
    }

    /// Collection named by the command; users are checked before projects
    pub fn target(&self) -> TargetCollection {
        if self.has_any(USER_TOKENS) {
            TargetCollection::Users
        } else if self.has_any(PROJECT_TOKENS) {
            TargetCollection::Projects
        } else {
            TargetCollection::Unknown
        }
    }

    pub fn first_integer(&self) -> Option<u64> {
        self.tokens.iter().find_map(|t| t.parse::<u64>().ok())
    }

    /// Integer directly after any occurrence of `words`, skipping a literal "id"
    ///
    /// "user 2" and "user id 2" both yield 2; in "the 2 users, then user 3"
    /// it is 3.
    pub fn integer_after(&self, words: &[&str]) -> Option<u64> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| words.contains(&t.as_str()))
            .find_map(|(start, _)| {
                let mut rest = self.tokens[start + 1..].iter();
                let mut next = rest.next()?;
                if next == "id" {
                    next = rest.next()?;
                }
                next.parse::<u64>().ok()
            })
    }

    /// First token that looks like an email address
    pub fn email(&self) -> Option<&str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .find(|t| t.contains('@') && !t.starts_with('@') && !t.ends_with('@'))
    }
}

/// Compiled patterns for free-text attributes
///
/// Patterns run on the raw command so extracted values keep their casing.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    name: Regex,
    bare_name: Regex,
    department: Regex,
    budget: Regex,
    manager: Regex,
    assignment: Regex,
}

impl FieldExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let value_end = format!(r#"["']?(?:\s+(?:{STOP_WORDS})\b|[.,!?;]|$)"#);
        // an assigned value ends at "and", a clause naming a collection
        // ("for project 3", "on user 2") or the end of the command
        let assignment_end = format!(
            r#"["']?(?:\s+and\s+|\s+(?:(?:for|on|of|in|at)\s+(?:the\s+)?)?(?:{COLLECTION_WORDS})\b|[,;]|[.!?]?$)"#
        );
        Ok(Self {
            name: Regex::new(&format!(r#"(?i)\b(?:called|named)\s+["']?(.+?){value_end}"#))?,
            bare_name: Regex::new(r"\b(?:[Uu]sers?|[Pp]rojects?)\s+([A-Z][\w'-]*(?:\s+[A-Z][\w'-]*)*)")?,
            department: Regex::new(r"(?i)\bin\s+(?:the\s+)?([a-z][\w-]*)")?,
            budget: Regex::new(r"(?i)\bbudget\s+(?:of\s+)?\$?(\d[\d,]*(?:\.\d+)?)")?,
            manager: Regex::new(&format!(r#"(?i)\bmanaged\s+by\s+["']?(.+?){value_end}"#))?,
            assignment: Regex::new(&format!(
                r#"(?i)\b({ASSIGNABLE_FIELDS})\s+(?:to|=|as)\s+["']?(.+?){assignment_end}"#
            ))?,
        })
    }

    /// Name after "called"/"named", or a run of capitalised words after the
    /// collection word ("user Bob Stone")
    pub fn name(&self, raw: &str) -> Option<String> {
        self.name
            .captures(raw)
            .or_else(|| self.bare_name.captures(raw))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Department after "in", e.g. "in Marketing" → "Marketing"
    pub fn department(&self, raw: &str) -> Option<String> {
        self.department
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| capitalize(m.as_str()))
    }

    pub fn budget(&self, raw: &str) -> Option<Value> {
        let digits = self.budget.captures(raw)?.get(1)?.as_str().replace(',', "");
        number_value(&digits)
    }

    pub fn manager(&self, raw: &str) -> Option<String> {
        self.manager
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// `<field> to <value>` pairs, in command order
    ///
    /// Numeric values are returned as JSON numbers.
    pub fn assignments(&self, raw: &str) -> Vec<(String, Value)> {
        self.assignment
            .captures_iter(raw)
            .filter_map(|c| {
                let field = c.get(1)?.as_str().to_lowercase();
                let value = c.get(2)?.as_str().trim();
                if value.is_empty() {
                    return None;
                }
                let value = number_value(value).unwrap_or_else(|| Value::from(value));
                Some((field, value))
            })
            .collect()
    }
}

fn number_value(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

/// "engineering" → "Engineering"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokens_are_whole_words() {
        let cmd = CommandText::new("Add a project with budget 50,000.");
        assert!(cmd.has("add"));
        assert!(!cmd.has("get"));
        assert!(cmd.has("50"));
        assert_eq!(cmd.target(), TargetCollection::Projects);
    }

    #[test]
    fn test_email_and_hyphen_tokens() {
        let cmd = CommandText::new("Create user alice@example.com, status on-hold.");
        assert_eq!(cmd.email(), Some("alice@example.com"));
        assert!(cmd.has("on-hold"));
    }

    #[test]
    fn test_integer_after() {
        assert_eq!(CommandText::new("show user 2").integer_after(USER_TOKENS), Some(2));
        assert_eq!(CommandText::new("show user id 7").integer_after(USER_TOKENS), Some(7));
        assert_eq!(CommandText::new("show all users").integer_after(USER_TOKENS), None);
        assert_eq!(
            CommandText::new("the 2 inactive users, starting with user 3").integer_after(USER_TOKENS),
            Some(3)
        );
        assert_eq!(CommandText::new("delete user #3").first_integer(), Some(3));
    }

    #[test]
    fn test_target_prefers_users() {
        assert_eq!(
            CommandText::new("list users on projects").target(),
            TargetCollection::Users
        );
        assert_eq!(CommandText::new("list things").target(), TargetCollection::Unknown);
    }

    #[test]
    fn test_name_extraction() {
        let ex = FieldExtractor::new().unwrap();
        assert_eq!(
            ex.name("Create a new project called Atlas").as_deref(),
            Some("Atlas")
        );
        assert_eq!(
            ex.name("Add a new project called AI Research with budget 50000").as_deref(),
            Some("AI Research")
        );
        assert_eq!(
            ex.name("Create a new user named Alice in Marketing").as_deref(),
            Some("Alice")
        );
        assert_eq!(
            ex.name("Create user Bob in Engineering department").as_deref(),
            Some("Bob")
        );
        assert_eq!(ex.name("create a new user"), None);
    }

    #[test]
    fn test_project_attributes() {
        let ex = FieldExtractor::new().unwrap();
        let raw = "Add project called Apollo with budget $1,250,000 managed by Jane Smith";
        assert_eq!(ex.budget(raw), Some(json!(1250000)));
        assert_eq!(ex.manager(raw).as_deref(), Some("Jane Smith"));
    }

    #[test]
    fn test_department() {
        let ex = FieldExtractor::new().unwrap();
        assert_eq!(
            ex.department("create user Bob in the engineering team").as_deref(),
            Some("Engineering")
        );
        assert_eq!(ex.department("create user Bob"), None);
    }

    #[test]
    fn test_assignments() {
        let ex = FieldExtractor::new().unwrap();
        let pairs = ex.assignments("change project 2 status to completed and budget to 90000");
        assert_eq!(
            pairs,
            vec![
                ("status".to_string(), json!("completed")),
                ("budget".to_string(), json!(90000)),
            ]
        );
        assert!(ex.assignments("update user 2").is_empty());
    }

    #[test]
    fn test_assignment_stops_at_collection_clause() {
        let ex = FieldExtractor::new().unwrap();
        assert_eq!(
            ex.assignments("Change status to completed for project 3"),
            vec![("status".to_string(), json!("completed"))]
        );
        assert_eq!(
            ex.assignments("Update budget to 2 on project 3"),
            vec![("budget".to_string(), json!(2))]
        );
        assert_eq!(
            ex.assignments("set manager to Jane Smith for the project 1 and status to active"),
            vec![
                ("manager".to_string(), json!("Jane Smith")),
                ("status".to_string(), json!("active")),
            ]
        );
        assert_eq!(
            ex.assignments("update user 2 email to bob@example.com."),
            vec![("email".to_string(), json!("bob@example.com"))]
        );
    }

    #[test]
    fn test_verb_forms() {
        assert!(is_form_of("listing", "list"));
        assert!(is_form_of("lists", "list"));
        assert!(is_form_of("updating", "update"));
        assert!(is_form_of("updated", "update"));
        assert!(is_form_of("getting", "get"));
        assert!(is_form_of("modifies", "modify"));
        assert!(is_form_of("added", "add"));

        assert!(!is_form_of("budget", "get"));
        assert!(!is_form_of("address", "add"));
        assert!(!is_form_of("news", "new"));
        assert!(!is_form_of("lis", "list"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("sales"), "Sales");
        assert_eq!(capitalize(""), "");
    }
}
