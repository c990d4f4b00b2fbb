use serde::Serialize;

pub const SYSTEM_PROMPT: &str = "You are a workforce analytics assistant for team managers. \
Answer only from the data provided. Reply with a single JSON object and no prose outside it.";

/// Per-employee figures shared with the provider. Contact details are left out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDigest {
    pub name: String,
    pub position: Option<String>,
    pub final_score: u8,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub on_time_tasks: u32,
    pub overdue_tasks: u32,
}

pub fn team_insights_prompt(organization_name: &str, team: &[EmployeeDigest]) -> String {
    let data = serde_json::to_string_pretty(team).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Organization: {organization_name}\n\
         Team productivity data (scores are 0-100):\n{data}\n\n\
         Analyse the team and respond with JSON of the form \
         {{\"summary\": string, \"strengths\": [string], \"risks\": [string], \
         \"recommendations\": [string]}}."
    )
}

pub fn workforce_query_prompt(
    organization_name: &str,
    question: &str,
    team: &[EmployeeDigest],
) -> String {
    let data = serde_json::to_string_pretty(team).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Organization: {organization_name}\n\
         Team productivity data (scores are 0-100):\n{data}\n\n\
         Manager question: {question}\n\
         Respond with JSON of the form {{\"answer\": string, \"highlights\": [string]}}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest() -> EmployeeDigest {
        EmployeeDigest {
            name: "Ada".to_string(),
            position: Some("Engineer".to_string()),
            final_score: 82,
            total_tasks: 10,
            completed_tasks: 8,
            on_time_tasks: 7,
            overdue_tasks: 1,
        }
    }

    #[test]
    fn insights_prompt_embeds_team_data() {
        let prompt = team_insights_prompt("Acme", &[digest()]);
        assert!(prompt.contains("Organization: Acme"));
        assert!(prompt.contains("\"finalScore\": 82"));
        assert!(prompt.contains("\"recommendations\""));
    }

    #[test]
    fn query_prompt_carries_question() {
        let prompt = workforce_query_prompt("Acme", "who needs support?", &[digest()]);
        assert!(prompt.contains("Manager question: who needs support?"));
        assert!(prompt.contains("\"highlights\""));
    }
}
