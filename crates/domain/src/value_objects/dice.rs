//! Dice formulas built from tagged terms.
//!
//! A formula is a list of terms. Every term carries its [`TermKind`] from the
//! moment it is built, so presentation never has to recover "is this a boon
//! die?" from the rendered string. Supported dice notation:
//!
//! - `XdY` - roll X dice of size Y and sum them
//! - `XdYkh` - roll X dice and keep the single highest
//! - `XdYr1` - reroll each 1 once
//! - flat integers, joined with `+` / `-`

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error when parsing or building a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY terms and integers joined by + or -
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
    /// More dice than a single group can hold
    #[error("Too many dice in one group: {0}")]
    TooManyDice(u32),
    /// Modifier overflow
    #[error("Modifier value overflow")]
    ModifierOverflow,
}

/// What a term contributes to the roll. Drives presentation coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TermKind {
    /// The d20 of an attribute or luck roll
    Base,
    /// Flat attribute or extra modifier
    Modifier,
    Boons,
    Banes,
    /// Base damage dice of a weapon or spell
    Damage,
    /// Extra damage dice from effects or bonus damage
    BonusDamage,
    Healing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn of(value: i32) -> Self {
        if value < 0 {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }

    fn factor(&self) -> i32 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }

    /// `magnitude` with this sign, saturating at the `i32` bounds.
    fn apply(&self, magnitude: u32) -> i32 {
        let value = i64::from(self.factor()) * i64::from(magnitude);
        value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    fn symbol(&self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// Presentation role of a die, for coloring dice in the chat card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DieRole {
    Base,
    Boon,
    Bane,
}

impl DieRole {
    /// Role of the dice of a term. The d20 is always the base die; other dice
    /// follow the sign in front of their group.
    pub fn of_term(kind: TermKind, sign: Sign) -> Self {
        match (kind, sign) {
            (TermKind::Base, _) => DieRole::Base,
            (TermKind::Boons, _) => DieRole::Boon,
            (TermKind::Banes, _) => DieRole::Bane,
            (_, Sign::Plus) => DieRole::Boon,
            (_, Sign::Minus) => DieRole::Bane,
        }
    }
}

/// A group of identical dice such as `2d6`, `1d6kh` or `2d6r1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceGroup {
    pub count: u8,
    pub faces: u8,
    /// Keep only the single highest die of the group.
    #[serde(default)]
    pub keep_highest: bool,
    /// Reroll each 1 once (the brutal trait).
    #[serde(default)]
    pub reroll_ones: bool,
}

impl DiceGroup {
    pub fn new(count: u32, faces: u32) -> Result<Self, DiceParseError> {
        if count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if faces < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        let count = u8::try_from(count).map_err(|_| DiceParseError::TooManyDice(count))?;
        let faces = u8::try_from(faces).map_err(|_| DiceParseError::InvalidDieSize)?;
        Ok(Self {
            count,
            faces,
            keep_highest: false,
            reroll_ones: false,
        })
    }

    pub fn d20() -> Self {
        Self {
            count: 1,
            faces: 20,
            keep_highest: false,
            reroll_ones: false,
        }
    }

    /// `Nd6kh`: N six-sided dice, keep the highest one.
    pub fn boon_pool(count: u32) -> Result<Self, DiceParseError> {
        let mut group = Self::new(count, 6)?;
        group.keep_highest = true;
        Ok(group)
    }

    pub fn with_reroll_ones(mut self) -> Self {
        self.reroll_ones = true;
        self
    }

    pub fn notation(&self) -> String {
        let mut out = format!("{}d{}", self.count, self.faces);
        if self.reroll_ones {
            out.push_str("r1");
        }
        if self.keep_highest {
            out.push_str("kh");
        }
        out
    }

    fn parse(token: &str) -> Result<Self, DiceParseError> {
        let d_pos = token.find('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", token))
        })?;

        let count_str = &token[..d_pos];
        let count: u32 = if count_str.is_empty() {
            1 // "d6" means "1d6"
        } else {
            count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?
        };

        let after_d = &token[d_pos + 1..];
        let faces_end = after_d
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_d.len());
        let faces: u32 = after_d[..faces_end].parse().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", after_d))
        })?;

        let mut group = Self::new(count, faces)?;
        let mut suffix = &after_d[faces_end..];
        while !suffix.is_empty() {
            if let Some(rest) = suffix.strip_prefix("kh1").or_else(|| suffix.strip_prefix("kh")) {
                group.keep_highest = true;
                suffix = rest;
            } else if let Some(rest) = suffix.strip_prefix("r1") {
                group.reroll_ones = true;
                suffix = rest;
            } else {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Unsupported dice modifier: '{}'",
                    suffix
                )));
            }
        }
        Ok(group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum TermBody {
    Dice(DiceGroup),
    /// Magnitude only; the sign lives on the term.
    Flat(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaTerm {
    pub kind: TermKind,
    pub sign: Sign,
    pub body: TermBody,
}

impl FormulaTerm {
    pub fn dice(kind: TermKind, sign: Sign, group: DiceGroup) -> Self {
        Self {
            kind,
            sign,
            body: TermBody::Dice(group),
        }
    }

    pub fn flat(kind: TermKind, value: i32) -> Self {
        Self {
            kind,
            sign: Sign::of(value),
            body: TermBody::Flat(value.unsigned_abs()),
        }
    }

    fn body_notation(&self) -> String {
        match &self.body {
            TermBody::Dice(group) => group.notation(),
            TermBody::Flat(value) => value.to_string(),
        }
    }
}

/// How terms are joined when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormulaStyle {
    /// `1d20+2+1d6kh` (attribute rolls)
    #[default]
    Compact,
    /// `2d6 + 1d6 + 2` (damage and healing rolls)
    Spaced,
}

/// An ordered list of tagged terms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollFormula {
    pub terms: Vec<FormulaTerm>,
    #[serde(default)]
    pub style: FormulaStyle,
}

impl RollFormula {
    pub fn compact() -> Self {
        Self {
            terms: Vec::new(),
            style: FormulaStyle::Compact,
        }
    }

    pub fn spaced() -> Self {
        Self {
            terms: Vec::new(),
            style: FormulaStyle::Spaced,
        }
    }

    pub fn push(&mut self, term: FormulaTerm) {
        self.terms.push(term);
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Parse a sum of dice groups and integers (e.g. `2d6+1`, `1d6 + 1d6 - 2`).
    ///
    /// Dice groups get `dice_kind`, integers become [`TermKind::Modifier`].
    pub fn parse_terms(input: &str, dice_kind: TermKind) -> Result<Vec<FormulaTerm>, DiceParseError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if compact.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let mut terms = Vec::new();
        let mut sign = Sign::Plus;
        let mut token = String::new();
        let mut flush = |token: &mut String, sign: Sign| -> Result<(), DiceParseError> {
            if token.is_empty() {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Dangling operator in '{}'",
                    input.trim()
                )));
            }
            let term = if token.contains('d') {
                FormulaTerm::dice(dice_kind, sign, DiceGroup::parse(token)?)
            } else {
                let value: u32 = token.parse().map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid term: '{}'", token))
                })?;
                if value > i32::MAX as u32 {
                    return Err(DiceParseError::ModifierOverflow);
                }
                FormulaTerm {
                    kind: TermKind::Modifier,
                    sign,
                    body: TermBody::Flat(value),
                }
            };
            terms.push(term);
            token.clear();
            Ok(())
        };

        for (index, c) in compact.chars().enumerate() {
            match c {
                '+' | '-' if index == 0 => {
                    sign = if c == '-' { Sign::Minus } else { Sign::Plus };
                }
                '+' | '-' => {
                    flush(&mut token, sign)?;
                    sign = if c == '-' { Sign::Minus } else { Sign::Plus };
                }
                _ => token.push(c),
            }
        }
        flush(&mut token, sign)?;
        Ok(terms)
    }

    /// Apply `f` to every dice group in the formula.
    pub fn map_dice(&mut self, f: impl Fn(DiceGroup) -> DiceGroup) {
        for term in &mut self.terms {
            if let TermBody::Dice(group) = term.body {
                term.body = TermBody::Dice(f(group));
            }
        }
    }

    /// Render the formula string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, term) in self.terms.iter().enumerate() {
            let body = term.body_notation();
            match (index, self.style, term.sign) {
                (0, _, Sign::Plus) => out.push_str(&body),
                (0, _, Sign::Minus) => {
                    out.push('-');
                    out.push_str(&body);
                }
                (_, FormulaStyle::Compact, sign) => {
                    out.push(sign.symbol());
                    out.push_str(&body);
                }
                (_, FormulaStyle::Spaced, sign) => {
                    out.push(' ');
                    out.push(sign.symbol());
                    out.push(' ');
                    out.push_str(&body);
                }
            }
        }
        out
    }

    /// Roll every die in term order.
    ///
    /// `rng(min, max)` must return an integer in `min..=max`.
    pub fn evaluate(&self, mut rng: impl FnMut(i32, i32) -> i32) -> EvaluatedFormula {
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let evaluated = match term.body {
                TermBody::Flat(value) => EvaluatedTerm {
                    term: *term,
                    role: None,
                    dice: Vec::new(),
                    total: term.sign.apply(value),
                },
                TermBody::Dice(group) => {
                    let mut dice = roll_group(&group, &mut rng);
                    if group.keep_highest {
                        keep_single_highest(&mut dice);
                    }
                    let kept: i32 = dice.iter().filter(|d| d.active).map(|d| d.result).sum();
                    EvaluatedTerm {
                        term: *term,
                        role: Some(DieRole::of_term(term.kind, term.sign)),
                        dice,
                        total: term.sign.factor() * kept,
                    }
                }
            };
            terms.push(evaluated);
        }

        let total = terms.iter().fold(0i32, |acc, t| acc.saturating_add(t.total));
        EvaluatedFormula {
            formula: self.render(),
            terms,
            total,
        }
    }
}

impl std::fmt::Display for RollFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn roll_group(group: &DiceGroup, rng: &mut impl FnMut(i32, i32) -> i32) -> Vec<DieResult> {
    let faces = group.faces as i32;
    let mut dice = Vec::with_capacity(group.count as usize);
    for _ in 0..group.count {
        let result = rng(1, faces);
        if group.reroll_ones && result == 1 {
            dice.push(DieResult {
                result,
                active: false,
                rerolled: true,
            });
            dice.push(DieResult {
                result: rng(1, faces),
                active: true,
                rerolled: false,
            });
        } else {
            dice.push(DieResult {
                result,
                active: true,
                rerolled: false,
            });
        }
    }
    dice
}

fn keep_single_highest(dice: &mut [DieResult]) {
    let best = dice
        .iter()
        .enumerate()
        .filter(|(_, d)| d.active)
        // First of the highest results wins ties
        .fold(None::<(usize, i32)>, |best, (index, d)| match best {
            Some((_, value)) if value >= d.result => best,
            _ => Some((index, d.result)),
        })
        .map(|(index, _)| index);

    for (index, die) in dice.iter_mut().enumerate() {
        if Some(index) != best {
            die.active = false;
        }
    }
}

/// One physical die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DieResult {
    pub result: i32,
    /// Counts toward the total (false when discarded by `kh` or rerolled).
    pub active: bool,
    /// This die showed a 1 and was rerolled.
    pub rerolled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedTerm {
    pub term: FormulaTerm,
    /// `None` for flat terms.
    pub role: Option<DieRole>,
    pub dice: Vec<DieResult>,
    /// Signed contribution to the total.
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedFormula {
    pub formula: String,
    pub terms: Vec<EvaluatedTerm>,
    pub total: i32,
}

impl EvaluatedFormula {
    /// The natural d20 result, if the formula has a base die.
    pub fn natural_d20(&self) -> Option<i32> {
        self.terms
            .iter()
            .find(|t| t.term.kind == TermKind::Base)
            .and_then(|t| t.dice.iter().find(|d| d.active))
            .map(|d| d.result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// RNG that replays a fixed script of results.
    pub(crate) fn scripted(results: &[i32]) -> impl FnMut(i32, i32) -> i32 + '_ {
        let mut iter = results.iter();
        move |min, max| {
            let value = *iter.next().expect("script exhausted");
            assert!((min..=max).contains(&value), "{} outside {}..={}", value, min, max);
            value
        }
    }

    fn attribute_formula(boons: i32) -> RollFormula {
        let mut formula = RollFormula::compact();
        formula.push(FormulaTerm::dice(TermKind::Base, Sign::Plus, DiceGroup::d20()));
        formula.push(FormulaTerm::flat(TermKind::Modifier, 2));
        if boons != 0 {
            let kind = if boons > 0 { TermKind::Boons } else { TermKind::Banes };
            let pool = DiceGroup::boon_pool(boons.unsigned_abs()).unwrap();
            formula.push(FormulaTerm::dice(kind, Sign::of(boons), pool));
        }
        formula
    }

    #[test]
    fn test_render_compact() {
        assert_eq!(attribute_formula(1).render(), "1d20+2+1d6kh");
        assert_eq!(attribute_formula(-3).render(), "1d20+2-3d6kh");
        assert_eq!(attribute_formula(0).render(), "1d20+2");
    }

    #[test]
    fn test_render_spaced() {
        let mut formula = RollFormula::spaced();
        for term in RollFormula::parse_terms("2d6+1d6-2", TermKind::Damage).unwrap() {
            formula.push(term);
        }
        assert_eq!(formula.render(), "2d6 + 1d6 - 2");
    }

    #[test]
    fn test_parse_terms() {
        let terms = RollFormula::parse_terms(" 2D6 + 1 ", TermKind::Damage).unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].body, TermBody::Dice(DiceGroup::new(2, 6).unwrap()));
        assert_eq!(terms[1].kind, TermKind::Modifier);
        assert_eq!(terms[1].body, TermBody::Flat(1));

        let terms = RollFormula::parse_terms("d6r1kh", TermKind::Damage).unwrap();
        let TermBody::Dice(group) = terms[0].body else {
            panic!("expected dice");
        };
        assert!(group.keep_highest && group.reroll_ones);
        assert_eq!(group.count, 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(RollFormula::parse_terms("  ", TermKind::Damage), Err(DiceParseError::Empty));
        assert_eq!(
            RollFormula::parse_terms("0d6", TermKind::Damage),
            Err(DiceParseError::InvalidDiceCount)
        );
        assert_eq!(
            RollFormula::parse_terms("1d1", TermKind::Damage),
            Err(DiceParseError::InvalidDieSize)
        );
        assert!(matches!(
            RollFormula::parse_terms("2d6+", TermKind::Damage),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            RollFormula::parse_terms("2d6x", TermKind::Damage),
            Err(DiceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_keep_highest_keeps_one_die() {
        let evaluated = attribute_formula(3).evaluate(scripted(&[10, 2, 5, 4]));
        let boons = &evaluated.terms[2];
        assert_eq!(boons.total, 5);
        assert_eq!(boons.dice.iter().filter(|d| d.active).count(), 1);
        assert_eq!(boons.role, Some(DieRole::Boon));
        assert_eq!(evaluated.total, 10 + 2 + 5);
        assert_eq!(evaluated.natural_d20(), Some(10));
    }

    #[test]
    fn test_banes_subtract_highest_die() {
        let evaluated = attribute_formula(-2).evaluate(scripted(&[12, 6, 3]));
        let banes = &evaluated.terms[2];
        assert_eq!(banes.total, -6);
        assert_eq!(banes.role, Some(DieRole::Bane));
        assert_eq!(evaluated.total, 12 + 2 - 6);
    }

    #[test]
    fn test_reroll_ones_once() {
        let mut formula = RollFormula::spaced();
        formula.push(FormulaTerm::dice(
            TermKind::Damage,
            Sign::Plus,
            DiceGroup::new(2, 6).unwrap().with_reroll_ones(),
        ));
        // First die 1 -> rerolled to 1 and kept, second die 4.
        let evaluated = formula.evaluate(scripted(&[1, 1, 4]));
        let dice = &evaluated.terms[0].dice;
        assert_eq!(dice.len(), 3);
        assert!(dice[0].rerolled && !dice[0].active);
        assert!(dice[1].active && !dice[1].rerolled);
        assert_eq!(evaluated.total, 5);
    }

    #[test]
    fn test_map_dice_only_touches_dice() {
        let mut formula = RollFormula::spaced();
        for term in RollFormula::parse_terms("2d6+3", TermKind::Damage).unwrap() {
            formula.push(term);
        }
        formula.map_dice(DiceGroup::with_reroll_ones);
        assert_eq!(formula.render(), "2d6r1 + 3");
    }

    #[test]
    fn test_extreme_flat_terms_saturate() {
        let mut formula = RollFormula::spaced();
        formula.push(FormulaTerm::flat(TermKind::Damage, i32::MIN));
        assert_eq!(formula.evaluate(|_, _| 0).total, i32::MIN);

        formula.push(FormulaTerm::flat(TermKind::Damage, -1));
        assert_eq!(formula.evaluate(|_, _| 0).total, i32::MIN);

        let mut formula = RollFormula::spaced();
        formula.push(FormulaTerm::flat(TermKind::Damage, i32::MAX));
        formula.push(FormulaTerm::flat(TermKind::Damage, 1));
        assert_eq!(formula.evaluate(|_, _| 0).total, i32::MAX);
    }

    #[test]
    fn test_too_many_dice() {
        assert_eq!(DiceGroup::boon_pool(300), Err(DiceParseError::TooManyDice(300)));
    }
}
