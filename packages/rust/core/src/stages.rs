//! Stage prompt builder.
//!
//! Pure template rendering: `(stage, meeting inputs, prior outputs)` →
//! a [`StagePrompt`]. No execution happens here; the pipeline hands the
//! rendered prompt to the execution engine. Prior stage outputs are embedded
//! verbatim in the instructions of dependent stages.

use meetbrief_shared::{MeetingRequest, Result, Stage, StageOutputs, StagePrompt};

/// Render the prompt for one stage.
///
/// Fails with a validation error when a required prior output is missing —
/// the pipeline's execution order guarantees this never happens in practice.
pub fn build(stage: Stage, request: &MeetingRequest, outputs: &StageOutputs) -> Result<StagePrompt> {
    match stage {
        Stage::Research => Ok(research_prompt(request)),
        Stage::IndustryAnalysis => Ok(industry_prompt(request)),
        Stage::Strategy => strategy_prompt(request, outputs),
        Stage::Summary => summary_prompt(request, outputs),
    }
}

fn research_prompt(request: &MeetingRequest) -> StagePrompt {
    let participants = request.participants_line();

    StagePrompt {
        system: "You are a research specialist. Your mission is to uncover detailed \
                 information about the individuals participating in the meeting, \
                 prioritizing professional-profile data such as About, Experience, and \
                 Education sections. Your findings lay the groundwork for strategic \
                 meeting preparation."
            .into(),
        instructions: format!(
            "Use the lookup_person tool to find professional profiles for the \
             following participants:\n{participants}\n\n\
             For each participant, call lookup_person once with their name. Your job \
             is to extract, verbatim from the tool output:\n\
             - Name\n\
             - Top 1-2 snippet summaries (if present)\n\
             - Profile URL (if available)\n\
             Only return structured output from the search results. Do not summarize \
             or infer content. Do NOT fabricate or guess URLs; only return profile \
             links that appear in the tool results."
        ),
        expected_output: "A JSON array, one object per participant:\n\
                          [\n  {\n    \"name\": \"Participant Name\",\n    \
                          \"linkedin_url\": \"<URL or null>\",\n    \
                          \"snippets\": [\"Snippet 1\", \"Snippet 2\"]\n  }\n]"
            .into(),
    }
}

fn industry_prompt(request: &MeetingRequest) -> StagePrompt {
    StagePrompt {
        system: "You are an industry analyst. Your analysis identifies key trends, \
                 challenges facing the industry, and potential opportunities that \
                 could be leveraged during the meeting for strategic advantage."
            .into(),
        instructions: format!(
            "Analyze the current industry trends, challenges, and opportunities \
             relevant to the meeting's context. Consider market reports, recent \
             developments, and expert opinions to provide a comprehensive overview \
             of the industry landscape. You may use the search tools to ground your \
             analysis.\n\n\
             Participants: {}\n\
             Meeting context: {}",
            request.participants_line(),
            request.context
        ),
        expected_output: "An insightful analysis that identifies major trends, \
                          potential challenges, and strategic opportunities."
            .into(),
    }
}

fn strategy_prompt(request: &MeetingRequest, outputs: &StageOutputs) -> Result<StagePrompt> {
    let research = outputs.require(Stage::Research)?;
    let industry = outputs.require(Stage::IndustryAnalysis)?;

    Ok(StagePrompt {
        system: "You are a meeting strategy advisor. Your expertise guides the \
                 development of talking points, insightful questions, and strategic \
                 angles to ensure the meeting's objectives are achieved."
            .into(),
        instructions: format!(
            "Develop strategic talking points, questions, and discussion angles \
             for the meeting, based on the research and industry analysis below.\n\n\
             Meeting context: {}\n\
             Meeting objective: {}\n\n\
             --- Participant research ---\n{research}\n\n\
             --- Industry analysis ---\n{industry}",
            request.context, request.objective
        ),
        expected_output: "A complete report with key talking points, strategic \
                          questions, and proposed angles to achieve the meeting's \
                          objective."
            .into(),
    })
}

fn summary_prompt(request: &MeetingRequest, outputs: &StageOutputs) -> Result<StagePrompt> {
    let research = outputs.require(Stage::Research)?;
    let industry = outputs.require(Stage::IndustryAnalysis)?;
    let strategy = outputs.require(Stage::Strategy)?;

    Ok(StagePrompt {
        system: "You are a briefing coordinator, responsible for writing the final \
                 output. Combine the findings from the other stages into a clear, \
                 well-structured briefing document."
            .into(),
        instructions: format!(
            "Compile the research findings, industry analysis, and strategic \
             talking points below into a concise, comprehensive briefing document \
             for the meeting. The briefing must use these sections:\n\
             - Executive Summary\n\
             - Participant Bios\n\
             - Industry Overview\n\
             - Talking Points\n\
             - Strategic Recommendations\n\n\
             If the participant research contains only snippets and a profile URL, \
             do NOT generate biographical summaries or descriptions; list only the \
             name, the snippets, and the URL verbatim.\n\n\
             Meeting context: {}\n\
             Meeting objective: {}\n\n\
             --- Participant research ---\n{research}\n\n\
             --- Industry analysis ---\n{industry}\n\n\
             --- Meeting strategy ---\n{strategy}",
            request.context, request.objective
        ),
        expected_output: "A well-structured briefing document with the five named \
                          sections, easy to digest, equipping participants with all \
                          necessary information and strategies."
            .into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meetbrief_shared::StageOutput;

    fn request() -> MeetingRequest {
        MeetingRequest::from_form(
            "Alice Smith, Bob Lee",
            "Quarterly partnership review",
            "Secure renewal",
        )
        .expect("valid request")
    }

    fn outputs_through(stage: Stage) -> StageOutputs {
        let mut outputs = StageOutputs::new();
        for s in Stage::all() {
            outputs.insert(StageOutput {
                stage: s,
                content: format!("<{s} findings>"),
            });
            if s == stage {
                break;
            }
        }
        outputs
    }

    #[test]
    fn research_lists_every_participant() {
        let prompt = build(Stage::Research, &request(), &StageOutputs::new()).expect("build");
        assert!(prompt.instructions.contains("Alice Smith, Bob Lee"));
        assert!(prompt.instructions.contains("lookup_person"));
        // Fabrication is explicitly prohibited.
        assert!(prompt.instructions.contains("Do NOT fabricate"));
        assert!(prompt.expected_output.contains("linkedin_url"));
    }

    #[test]
    fn industry_embeds_context() {
        let prompt =
            build(Stage::IndustryAnalysis, &request(), &StageOutputs::new()).expect("build");
        assert!(prompt.instructions.contains("Quarterly partnership review"));
        assert!(prompt.system.contains("industry analyst"));
    }

    #[test]
    fn strategy_embeds_prior_outputs() {
        let prompt = build(
            Stage::Strategy,
            &request(),
            &outputs_through(Stage::IndustryAnalysis),
        )
        .expect("build");
        assert!(prompt.instructions.contains("<Research findings>"));
        assert!(prompt.instructions.contains("<IndustryAnalysis findings>"));
        assert!(prompt.instructions.contains("Secure renewal"));
    }

    #[test]
    fn strategy_fails_without_dependencies() {
        let err = build(Stage::Strategy, &request(), &StageOutputs::new()).unwrap_err();
        assert!(err.to_string().contains("missing required output"));
    }

    #[test]
    fn summary_embeds_all_three_and_names_sections() {
        let prompt = build(Stage::Summary, &request(), &outputs_through(Stage::Strategy))
            .expect("build");
        for section in [
            "Executive Summary",
            "Participant Bios",
            "Industry Overview",
            "Talking Points",
            "Strategic Recommendations",
        ] {
            assert!(prompt.instructions.contains(section), "missing {section}");
        }
        assert!(prompt.instructions.contains("<Strategy findings>"));
        // Sparse bios must stay verbatim.
        assert!(prompt.instructions.contains("do NOT generate biographical"));
    }

    #[test]
    fn summary_fails_without_strategy() {
        let err = build(
            Stage::Summary,
            &request(),
            &outputs_through(Stage::IndustryAnalysis),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Strategy"));
    }
}
