/// Rule inference and reconciliation. Pure functions, no side effects.
///
/// A rule is three word blocks in a straight line, read left-to-right or
/// top-to-bottom: `Subject Is Attribute`. Reversed order never counts.
///
/// ## Is Tile Truth Table
/// ┌────────────────────────────────┬────────────────────┐
/// │ Neighbours                     │ Rule in that axis  │
/// ├────────────────────────────────┼────────────────────┤
/// │ up = Subject, down = Attribute │ vertical rule      │
/// │ left = Subject, right = Attr.  │ horizontal rule    │
/// │ anything else (incl. swapped)  │ none               │
/// └────────────────────────────────┴────────────────────┘
///
/// ## Reconciliation
///   1. Drop empty axes.
///   2. Keep only the first rule seen for each subject (scan order).
///   3. Diff against last tick: new rules are enforced, missing ones revoked.

use std::fmt;

use super::actor::{IsLight, Noun, Property, Word};

/// The text carried by every Is block. The leading space is what makes
/// `"Wall" + " is" + "Push"` read as `"Wall isPush"`.
pub const IS_WORD: &str = " is";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rule {
    pub subject: Noun,
    pub property: Property,
}

impl Rule {
    pub fn new(subject: Noun, property: Property) -> Self {
        Rule { subject, property }
    }
}

/// Canonical text form: `"Subject isAttribute"`.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.subject.word(), IS_WORD, self.property.word())
    }
}

/// Result of reading one Is tile's neighbours.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IsScan {
    pub vertical: Option<Rule>,
    pub horizontal: Option<Rule>,
    pub light: IsLight,
}

impl IsScan {
    /// `(vertical, horizontal)` in their text form, `""` for no rule.
    pub fn texts(&self) -> (String, String) {
        let text = |r: Option<Rule>| r.map(|r| r.to_string()).unwrap_or_default();
        (text(self.vertical), text(self.horizontal))
    }
}

fn read_axis(first: Option<Word>, second: Option<Word>) -> Option<Rule> {
    match (first?, second?) {
        (Word::Subject(n), Word::Attribute(p)) => Some(Rule::new(n, p)),
        _ => None,
    }
}

/// Read the four neighbours of an Is tile. `None` = empty cell or grid edge;
/// characters count as `None` too since only word blocks spell rules.
pub fn scan_is(up: Option<Word>, down: Option<Word>, left: Option<Word>, right: Option<Word>) -> IsScan {
    let vertical = read_axis(up, down);
    let horizontal = read_axis(left, right);
    let count = vertical.is_some() as usize + horizontal.is_some() as usize;
    IsScan { vertical, horizontal, light: IsLight::from_count(count) }
}

/// Collapse the raw scan output (with empty axes) into the canonical rule
/// set: at most one rule per subject, the earliest one in scan order.
pub fn reconcile(raw: &[Option<Rule>]) -> Vec<Rule> {
    let mut out: Vec<Rule> = Vec::new();
    for rule in raw.iter().flatten() {
        if !out.iter().any(|r| r.subject == rule.subject) {
            out.push(*rule);
        }
    }
    out
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RuleDiff {
    pub enforced: Vec<Rule>,
    pub revoked: Vec<Rule>,
}

impl RuleDiff {
    pub fn is_empty(&self) -> bool {
        self.enforced.is_empty() && self.revoked.is_empty()
    }
}

pub fn diff(previous: &[Rule], current: &[Rule]) -> RuleDiff {
    RuleDiff {
        enforced: current.iter().filter(|r| !previous.contains(r)).copied().collect(),
        revoked: previous.iter().filter(|r| !current.contains(r)).copied().collect(),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn subj(n: Noun) -> Option<Word> {
        Some(Word::Subject(n))
    }

    fn attr(p: Property) -> Option<Word> {
        Some(Word::Attribute(p))
    }

    #[test]
    fn rule_text_has_no_space_after_is() {
        assert_eq!(Rule::new(Noun::Wall, Property::Push).to_string(), "Wall isPush");
        assert_eq!(Rule::new(Noun::Flag, Property::Victory).to_string(), "Flag isVictory");
    }

    #[test]
    fn vertical_rule_only() {
        let s = scan_is(subj(Noun::Wall), attr(Property::Push), None, None);
        assert_eq!(s.texts(), ("Wall isPush".to_string(), String::new()));
        assert_eq!(s.light, IsLight::Half);
    }

    #[test]
    fn horizontal_rule_only() {
        let s = scan_is(None, None, subj(Noun::Rock), attr(Property::You));
        assert_eq!(s.texts(), (String::new(), "Rock isYou".to_string()));
        assert_eq!(s.light, IsLight::Half);
    }

    #[test]
    fn both_axes() {
        let s = scan_is(subj(Noun::Wall), attr(Property::Stop), subj(Noun::Meepo), attr(Property::You));
        assert_eq!(s.vertical, Some(Rule::new(Noun::Wall, Property::Stop)));
        assert_eq!(s.horizontal, Some(Rule::new(Noun::Meepo, Property::You)));
        assert_eq!(s.light, IsLight::Full);
    }

    #[test]
    fn reversed_order_is_not_a_rule() {
        let s = scan_is(attr(Property::Push), subj(Noun::Wall), attr(Property::You), subj(Noun::Rock));
        assert_eq!(s.vertical, None);
        assert_eq!(s.horizontal, None);
        assert_eq!(s.light, IsLight::Off);
    }

    #[test]
    fn two_subjects_or_two_attributes_are_not_rules() {
        let s = scan_is(subj(Noun::Wall), subj(Noun::Rock), attr(Property::You), attr(Property::Push));
        assert_eq!(s.light, IsLight::Off);
        let s = scan_is(Some(Word::Is { light: IsLight::Off }), attr(Property::Push), None, None);
        assert_eq!(s.vertical, None);
    }

    #[test]
    fn missing_neighbour_is_not_a_rule() {
        let s = scan_is(subj(Noun::Wall), None, None, attr(Property::Push));
        assert_eq!(s.light, IsLight::Off);
    }

    #[test]
    fn scan_is_idempotent() {
        let a = scan_is(subj(Noun::Wall), attr(Property::Push), subj(Noun::Rock), None);
        let b = scan_is(subj(Noun::Wall), attr(Property::Push), subj(Noun::Rock), None);
        assert_eq!(a, b);
    }

    // ── reconcile ──

    #[test]
    fn reconcile_drops_empties() {
        let r = Rule::new(Noun::Wall, Property::Push);
        assert_eq!(reconcile(&[None, Some(r), None]), vec![r]);
        assert!(reconcile(&[None, None]).is_empty());
    }

    #[test]
    fn reconcile_collapses_identical_duplicates() {
        let r = Rule::new(Noun::Rock, Property::You);
        assert_eq!(reconcile(&[Some(r), None, Some(r), None]), vec![r]);
    }

    #[test]
    fn reconcile_keeps_earliest_conflicting_rule() {
        let push = Rule::new(Noun::Wall, Property::Push);
        let stop = Rule::new(Noun::Wall, Property::Stop);
        let you = Rule::new(Noun::Meepo, Property::You);
        assert_eq!(reconcile(&[Some(stop), Some(you), Some(push)]), vec![stop, you]);
        assert_eq!(reconcile(&[Some(push), Some(stop), Some(you)]), vec![push, you]);
    }

    #[test]
    fn reconcile_handles_each_subject_independently() {
        let a = Rule::new(Noun::Wall, Property::Push);
        let b = Rule::new(Noun::Rock, Property::Push);
        let c = Rule::new(Noun::Wall, Property::Stop);
        let d = Rule::new(Noun::Rock, Property::Stop);
        assert_eq!(reconcile(&[Some(a), Some(b), Some(c), Some(d)]), vec![a, b]);
    }

    // ── diff ──

    #[test]
    fn diff_enforces_new_and_revokes_missing() {
        let push = Rule::new(Noun::Wall, Property::Push);
        let you = Rule::new(Noun::Meepo, Property::You);
        let win = Rule::new(Noun::Flag, Property::Victory);
        let d = diff(&[push, you], &[you, win]);
        assert_eq!(d.enforced, vec![win]);
        assert_eq!(d.revoked, vec![push]);
        assert!(diff(&[you], &[you]).is_empty());
    }

    fn any_rule() -> impl Strategy<Value = Option<Rule>> {
        proptest::option::of(
            (0usize..Noun::ALL.len(), 0usize..Property::ALL.len())
                .prop_map(|(n, p)| Rule::new(Noun::ALL[n], Property::ALL[p])),
        )
    }

    proptest! {
        #[test]
        fn reconcile_one_rule_per_subject(raw in proptest::collection::vec(any_rule(), 0..16)) {
            let rules = reconcile(&raw);
            for (i, r) in rules.iter().enumerate() {
                prop_assert!(rules[i + 1..].iter().all(|o| o.subject != r.subject));
                let first = raw.iter().flatten().find(|o| o.subject == r.subject);
                prop_assert_eq!(first, Some(r));
            }
        }
    }
}
