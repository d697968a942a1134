use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::rng;
use rand::seq::IndexedRandom;

use storage::ProgressBridge;

use crate::error::RecommendationError;

//
// ─── SELECTIONS ────────────────────────────────────────────────────────────────
//

/// What the facilitator wants the activity to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Introduction,
    Practice,
    Reflection,
    TeamCommunication,
}

impl Goal {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Practice => "practice",
            Self::Reflection => "reflection",
            Self::TeamCommunication => "team communication",
        }
    }
}

/// Who the activity is run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Students,
    Employees,
    Newcomers,
}

impl Audience {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Employees => "employees",
            Self::Newcomers => "guests/newcomers",
        }
    }

    fn note(self) -> &'static str {
        match self {
            Self::Students => "With students, keep a fast pace and use examples from the course.",
            Self::Employees => {
                "With employees, tie it to a workplace scenario and an organizational goal."
            }
            Self::Newcomers => "With newcomers, use plain language and small steps.",
        }
    }
}

/// Optional building blocks the facilitator ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Quiz,
    Reflection,
    Discussion,
    TeamTalk,
}

impl Component {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Reflection => "reflection",
            Self::Discussion => "discussion",
            Self::TeamTalk => "team talk",
        }
    }
}

/// Error type for parsing selections out of CLI or form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSelectionError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseSelectionError {}

impl FromStr for Goal {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "introduction" | "intro" => Ok(Self::Introduction),
            "practice" => Ok(Self::Practice),
            "reflection" => Ok(Self::Reflection),
            "team-communication" | "team communication" => Ok(Self::TeamCommunication),
            _ => Err(ParseSelectionError {
                kind: "goal",
                raw: s.to_string(),
            }),
        }
    }
}

impl FromStr for Audience {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "students" => Ok(Self::Students),
            "employees" => Ok(Self::Employees),
            "newcomers" | "guests" => Ok(Self::Newcomers),
            _ => Err(ParseSelectionError {
                kind: "audience",
                raw: s.to_string(),
            }),
        }
    }
}

impl FromStr for Component {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiz" => Ok(Self::Quiz),
            "reflection" => Ok(Self::Reflection),
            "discussion" => Ok(Self::Discussion),
            "team-talk" | "team talk" => Ok(Self::TeamTalk),
            _ => Err(ParseSelectionError {
                kind: "component",
                raw: s.to_string(),
            }),
        }
    }
}

//
// ─── REQUEST & PLAN ────────────────────────────────────────────────────────────
//

/// Bounds of the minutes slider. Out-of-range requests are clamped, not
/// rejected, matching the slider control that produces them.
pub const MIN_MINUTES: u32 = 1;
pub const MAX_MINUTES: u32 = 15;

/// Raw form state. `goal` and `audience` stay optional so validation can
/// point at the missing selection the way the form's inline messages do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub goal: Option<Goal>,
    pub audience: Option<Audience>,
    pub minutes: u32,
    pub components: Vec<Component>,
}

/// A built activity plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub goal: Goal,
    pub audience: Audience,
    /// Minutes for opening / main part / closing. Each part has a floor
    /// of one minute, so very short totals can add up to more than the
    /// requested time.
    pub parts: (u32, u32, u32),
    pub text: String,
}

/// Builds the three-step activity recommendation and records the
/// interaction in the lesson location.
pub struct RecommendationService {
    bridge: Arc<ProgressBridge>,
}

impl RecommendationService {
    #[must_use]
    pub fn new(bridge: Arc<ProgressBridge>) -> Self {
        Self { bridge }
    }

    /// Validate the request and render a plan, using the thread RNG to
    /// vary phrasing.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError` when the goal, audience, or every
    /// component checkbox is missing.
    pub fn build(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendation, RecommendationError> {
        self.build_with_rng(request, &mut rng())
    }

    /// Same as [`build`](Self::build) with a caller-supplied RNG, so tests
    /// get deterministic phrasing.
    ///
    /// # Errors
    ///
    /// Returns `RecommendationError` when the goal, audience, or every
    /// component checkbox is missing.
    pub fn build_with_rng<R: rand::Rng + ?Sized>(
        &self,
        request: &RecommendationRequest,
        rng: &mut R,
    ) -> Result<Recommendation, RecommendationError> {
        let recommendation = render(request, rng)?;
        if let Err(err) = self.bridge.save_location("interaction_built") {
            tracing::debug!(%err, "interaction location save failed");
        }
        Ok(recommendation)
    }
}

fn render<R: rand::Rng + ?Sized>(
    request: &RecommendationRequest,
    rng: &mut R,
) -> Result<Recommendation, RecommendationError> {
    let goal = request.goal.ok_or(RecommendationError::MissingGoal)?;
    let audience = request
        .audience
        .ok_or(RecommendationError::MissingAudience)?;
    if request.components.is_empty() {
        return Err(RecommendationError::NoComponents);
    }

    // The slider reports 0 when untouched; fall back to the default.
    // Anything else is clamped into the slider's 1..=15 range so a raw
    // request value can never overflow the split arithmetic.
    let total = if request.minutes == 0 {
        3
    } else {
        request.minutes.clamp(MIN_MINUTES, MAX_MINUTES)
    };
    let part1 = (total * 3 / 10).max(1);
    let part2 = (total / 2).max(1);
    let part3 = total.saturating_sub(part1 + part2).max(1);

    let has = |c: Component| request.components.contains(&c);
    let opening = pick(rng, openings_for(goal));

    let mut lines = Vec::new();
    lines.push(format!(
        "Recommendation for {total} min with a \"{}\" audience and a \"{}\" goal.",
        audience.label(),
        goal.label()
    ));
    let chosen: Vec<&str> = request.components.iter().map(|c| c.label()).collect();
    lines.push(format!("Selected components: {}.", chosen.join(", ")));
    lines.push(String::new());

    lines.push(format!("1) Opening ({part1} min): {opening}"));
    lines.push(format!("   Audience fit: {}", audience.note()));

    if has(Component::Discussion) || has(Component::TeamTalk) {
        lines.push(format!(
            "2) Discussion ({part2} min): one prompt question, then a quick round of one sentence each."
        ));
    } else {
        lines.push(format!(
            "2) Activity ({part2} min): a short demonstration plus one task to carry out."
        ));
    }

    if has(Component::Quiz) {
        lines.push(format!(
            "3) Check ({part3} min): two short questions to confirm understanding."
        ));
    } else if has(Component::Reflection) {
        lines.push(format!(
            "3) Reflection ({part3} min): \"What was clear?\", \"What is still unclear?\""
        ));
    } else {
        lines.push(format!(
            "3) Wrap-up ({part3} min): one decision to take forward and what to do next time."
        ));
    }

    let mut tips = Vec::new();
    if goal == Goal::TeamCommunication {
        tips.push(pick(
            rng,
            &[
                "Tip: assign roles (discussion lead, summarizer, questioner).",
                "Tip: use the 1-2-4 rule: one sentence per participant, two rounds, then a conclusion.",
            ],
        ));
    }
    if has(Component::Quiz) {
        tips.push(pick(
            rng,
            &[
                "Suggested quiz: true/false plus one open question.",
                "Suggested quiz: two multiple-choice questions to close gaps.",
            ],
        ));
    }
    if has(Component::Reflection) {
        tips.push(pick(
            rng,
            &[
                "Reflection: write one thing you learned and one thing to improve.",
                "Reflection: \"What surprised me?\" and \"What will I apply tomorrow?\"",
            ],
        ));
    }
    if !tips.is_empty() {
        lines.push(String::new());
        lines.extend(tips.iter().map(|t| (*t).to_string()));
    }

    Ok(Recommendation {
        goal,
        audience,
        parts: (part1, part2, part3),
        text: lines.join("\n"),
    })
}

fn openings_for(goal: Goal) -> &'static [&'static str] {
    match goal {
        Goal::Introduction => &[
            "Start with a short opener to break the ice and get to know NAO.",
            "Best to begin with introductions: what NAO can do and how to work with it.",
        ],
        Goal::Practice => &[
            "Go for a short hands-on exercise with a clear task and quick feedback.",
            "What works best here: focused practice with examples and a demonstration.",
        ],
        Goal::Reflection => &[
            "Build in a reflective moment: what we learned and what to improve next time.",
            "Worth closing with a short reflection that produces insights.",
        ],
        Goal::TeamCommunication => &[
            "Build an activity that strengthens conversation, roles and listening in the team.",
            "The emphasis here is team communication: ground rules, roles and a summary.",
        ],
    }
}

fn pick<'a, R: rand::Rng + ?Sized>(rng: &mut R, options: &'a [&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use storage::{LocalStore, MemoryStore, NullSession};

    fn service() -> (RecommendationService, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        let bridge = Arc::new(ProgressBridge::new(Arc::new(NullSession), local.clone()));
        (RecommendationService::new(bridge), local)
    }

    fn request() -> RecommendationRequest {
        RecommendationRequest {
            goal: Some(Goal::Practice),
            audience: Some(Audience::Students),
            minutes: 10,
            components: vec![Component::Quiz],
        }
    }

    #[test]
    fn requires_goal_audience_and_a_component() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let mut r = request();
        r.goal = None;
        assert_eq!(
            service.build_with_rng(&r, &mut rng).unwrap_err(),
            RecommendationError::MissingGoal
        );

        let mut r = request();
        r.audience = None;
        assert_eq!(
            service.build_with_rng(&r, &mut rng).unwrap_err(),
            RecommendationError::MissingAudience
        );

        let mut r = request();
        r.components.clear();
        assert_eq!(
            service.build_with_rng(&r, &mut rng).unwrap_err(),
            RecommendationError::NoComponents
        );
    }

    #[test]
    fn splits_minutes_thirty_fifty_rest() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let plan = service.build_with_rng(&request(), &mut rng).unwrap();
        assert_eq!(plan.parts, (3, 5, 2));
    }

    #[test]
    fn every_part_gets_at_least_a_minute() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let mut r = request();
        r.minutes = 1;
        let plan = service.build_with_rng(&r, &mut rng).unwrap();
        assert_eq!(plan.parts, (1, 1, 1));
    }

    #[test]
    fn out_of_range_minutes_clamp_to_the_slider_bounds() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        // Far past the slider maximum, including the overflow edge.
        for minutes in [16, 1_000, u32::MAX] {
            let mut r = request();
            r.minutes = minutes;
            let plan = service.build_with_rng(&r, &mut rng).unwrap();
            assert_eq!(plan.parts, (4, 7, 4), "minutes {minutes}");
        }
    }

    #[test]
    fn zero_minutes_falls_back_to_the_default_slider_value() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let mut r = request();
        r.minutes = 0;
        let plan = service.build_with_rng(&r, &mut rng).unwrap();
        let (a, b, c) = plan.parts;
        assert_eq!(a + b + c, 3);
    }

    #[test]
    fn discussion_components_switch_the_middle_step() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let mut r = request();
        r.components = vec![Component::Discussion];
        let plan = service.build_with_rng(&r, &mut rng).unwrap();
        assert!(plan.text.contains("2) Discussion"));

        let plan = service.build_with_rng(&request(), &mut rng).unwrap();
        assert!(plan.text.contains("2) Activity"));
        assert!(plan.text.contains("3) Check"));
    }

    #[test]
    fn a_successful_build_records_the_interaction_location() {
        let (service, local) = service();
        let mut rng = StdRng::seed_from_u64(7);

        service.build_with_rng(&request(), &mut rng).unwrap();
        assert_eq!(
            local.get(storage::keys::LOCATION).unwrap().as_deref(),
            Some("interaction_built")
        );
    }

    #[test]
    fn a_failed_build_records_nothing() {
        let (service, local) = service();
        let mut rng = StdRng::seed_from_u64(7);

        let mut r = request();
        r.goal = None;
        assert!(service.build_with_rng(&r, &mut rng).is_err());
        assert_eq!(local.get(storage::keys::LOCATION).unwrap(), None);
    }

    #[test]
    fn selections_parse_from_form_values() {
        assert_eq!("practice".parse::<Goal>().unwrap(), Goal::Practice);
        assert_eq!(
            "team-communication".parse::<Goal>().unwrap(),
            Goal::TeamCommunication
        );
        assert_eq!("students".parse::<Audience>().unwrap(), Audience::Students);
        assert_eq!("quiz".parse::<Component>().unwrap(), Component::Quiz);
        assert!("dance".parse::<Component>().is_err());
    }
}
