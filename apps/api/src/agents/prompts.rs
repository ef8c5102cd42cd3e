// Prompt templates for the four structured agents.
// Profile placeholders ({name}, {education_level}, {field_of_study}, {gpa},
// {experience_years}, {skills}, {languages}, {achievements}, {goals}) are
// filled by `agents::fill_profile`; the rest are filled by each agent.

// ────────────────────────────────────────────────────────────────────────────
// Profile optimizer
// ────────────────────────────────────────────────────────────────────────────

pub const PROFILE_OPTIMIZER_SYSTEM: &str =
    "You are a senior scholarship and career advisor who reviews candidate profiles. \
    You judge completeness, competitive positioning for scholarships and fellowships, \
    gaps that could disqualify an application, and the quickest high-impact improvements. \
    Be specific, practical and encouraging.";

pub const PROFILE_OPTIMIZER_TEMPLATE: &str = r#"Review this profile and produce optimization recommendations.

PROFILE:
Name: {name}
Education: {education_level} in {field_of_study}
GPA: {gpa}
Experience: {experience_years} years
Skills: {skills}
Languages: {languages}
Achievements: {achievements}
Goals: {goals}

Provide:
1. profile_strength_score (0-10): overall competitiveness.
2. completeness_percentage (0-100): how complete the profile is.
3. match_potential_increase: expected improvement in percent if the advice is followed.
4. critical_gaps: category, severity (critical | moderate | minor), description, impact.
5. quick_wins: actions doable within two weeks: action, impact, time_estimate, priority (high | medium | low).
6. high_impact_improvements: 30-90 day improvements: area, current_state, target_state,
   action_steps, timeline, impact_score (0.0-1.0).
7. action_plan_30_days, action_plan_60_days, action_plan_90_days: period, goals, tasks, success_metrics.
8. overall_recommendation: a short encouraging summary.

Order critical_gaps and quick_wins from most to least important."#;

// ────────────────────────────────────────────────────────────────────────────
// Opportunity scout
// ────────────────────────────────────────────────────────────────────────────

pub const OPPORTUNITY_SCOUT_SYSTEM: &str =
    "You are an opportunity scout for scholarships, fellowships and academic programs. \
    You find what a candidate has missed: precise search queries, programs similar to \
    their best matches, and niche opportunities in their field.";

/// Extra placeholder: {top_matches}
pub const OPPORTUNITY_SCOUT_TEMPLATE: &str = r#"Build opportunity search strategies for this profile.

PROFILE:
Education: {education_level} in {field_of_study}
Skills: {skills}
Experience: {experience_years} years
Languages: {languages}
Goals: {goals}

TOP MATCHES SO FAR:
{top_matches}

Provide:
1. search_queries (5-7): query, reasoning, priority (high | medium | low).
2. similar_opportunities (3-5): title, type, why_similar, relevance_score (0.0-1.0).
3. hidden_opportunities (3-5): named niche programs or categories.
4. recommendation: overall search advice.

Name real programs and organizations wherever possible."#;

// ────────────────────────────────────────────────────────────────────────────
// Application strategist
// ────────────────────────────────────────────────────────────────────────────

pub const APPLICATION_STRATEGIST_SYSTEM: &str =
    "You are an application strategist for scholarships and fellowships. \
    You maximize an applicant's success by weighing match scores, deadlines, effort \
    against return, and diversification across opportunity types and locations. \
    You produce concrete weekly plans.";

/// Extra placeholder: {opportunities}
pub const APPLICATION_STRATEGIST_TEMPLATE: &str = r#"Create an application strategy for this profile and these opportunities.

PROFILE:
Education: {education_level} in {field_of_study}
Experience: {experience_years} years
Goals: {goals}

OPPORTUNITIES:
{opportunities}

Provide:
1. prioritized_applications, best first: opportunity_title, priority_level (High | Medium | Low),
   match_score, deadline, reasoning, estimated_effort_hours, success_probability (0.0-1.0),
   roi_score (0.0-1.0).
2. weekly_timeline for the next 8-12 weeks: week (a label such as "Week 1" or "Week 3-4"), tasks, deadline_focus.
3. strategy_summary.
4. effort_estimate_total_hours: the sum of all application hours.
5. recommended_focus: the 3-5 applications to prioritize.

Prefer quality over quantity and balance reach and safety applications."#;

// ────────────────────────────────────────────────────────────────────────────
// Match evaluator
// ────────────────────────────────────────────────────────────────────────────

pub const EVALUATOR_SYSTEM: &str =
    "You are an advisor who matches candidates to scholarships, jobs and academic programs. \
    Compare the candidate's qualifications with the opportunity's requirements, name the \
    strengths and the gaps, give an honest compatibility score, and recommend next steps. \
    Be encouraging but realistic.";

/// Extra placeholders: {opp_title}, {opp_type}, {opp_description}, {opp_requirements}
pub const EVALUATOR_TEMPLATE: &str = r#"CANDIDATE PROFILE:
Name: {name}
Education: {education_level} in {field_of_study}
GPA: {gpa}
Experience: {experience_years} years
Skills: {skills}
Languages: {languages}
Achievements: {achievements}
Goals: {goals}

OPPORTUNITY:
Title: {opp_title}
Type: {opp_type}
Description: {opp_description}
Requirements: {opp_requirements}

Evaluate the match:
1. compatibility_score from 0.0 to 1.0, where 1.0 is a perfect match.
2. strengths that make the candidate a good fit.
3. gaps or areas to improve.
4. recommendation: whether to apply and how to improve the odds."#;
