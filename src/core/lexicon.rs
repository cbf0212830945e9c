//! Emotion lexicon classifier: 12 emotions, English + Dutch tables
//!
//! Tables are built once and shared read-only. Scoring per emotion:
//! sum of hit weights (boosted by a preceding intensifier), divided by the
//! token count, capped at 1.0.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Emotion, EmotionAnalysis, EmotionHit, EmotionScore, Language, LanguageHits};
use crate::{
    EMOTION_SCORE_CAP, INTENSIFIER_BOOST, INTENSIFIER_REACH,
    LEXICON_WEIGHT_BASE, LEXICON_WEIGHT_PHRASE, LEXICON_WEIGHT_STRONG,
};

/// Keyword strength within a table row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strength {
    Base,
    Strong,
}

type Row = (Emotion, Language, Strength, &'static [&'static str]);

use Emotion::*;
use Language::{Dutch, English};
use Strength::{Base, Strong};

// =============================================================================
// ENGLISH TABLE
// =============================================================================

const ENGLISH_TABLE: &[Row] = &[
    (Joy, English, Base, &["happy", "joy", "joyful", "cheerful", "pleased", "glad", "content", "grateful", "merry", "delighted", "great", "wonderful"]),
    (Joy, English, Strong, &["ecstatic", "elated", "blissful", "overjoyed", "thrilled", "jubilant"]),
    (Sadness, English, Base, &["sad", "unhappy", "gloomy", "lonely", "sorrow", "tearful", "melancholy", "crying", "hurt"]),
    (Sadness, English, Strong, &["devastated", "heartbroken", "miserable", "depressed", "despair", "grief"]),
    (Anger, English, Base, &["angry", "mad", "annoyed", "irritated", "frustrated", "bitter", "resentful", "hostile", "pissed off"]),
    (Anger, English, Strong, &["furious", "enraged", "livid", "rage", "outraged", "seething"]),
    (Fear, English, Base, &["afraid", "scared", "anxious", "worried", "nervous", "uneasy", "tense", "fear"]),
    (Fear, English, Strong, &["terrified", "panic", "dread", "petrified", "horrified"]),
    (Surprise, English, Base, &["surprised", "amazed", "astonished", "startled", "unexpected", "taken aback", "caught off guard"]),
    (Surprise, English, Strong, &["stunned", "flabbergasted", "dumbfounded", "speechless"]),
    (Disgust, English, Base, &["disgusted", "gross", "repulsed", "sickened", "nauseated", "grossed out", "creeped out"]),
    (Disgust, English, Strong, &["revolted", "revolting", "appalled", "vile"]),
    (Trust, English, Base, &["trust", "confident", "secure", "safe", "reliable", "loyal", "certain", "assured", "rely on", "count on"]),
    (Trust, English, Strong, &["steadfast", "faithful"]),
    (Anticipation, English, Base, &["eager", "hopeful", "expectant", "excited", "anticipating", "looking forward", "can't wait", "cannot wait"]),
    (Anticipation, English, Strong, &["enthusiastic", "thrilled"]),
    (Shame, English, Base, &["ashamed", "embarrassed", "guilty", "regretful", "sheepish", "awkward"]),
    (Shame, English, Strong, &["humiliated", "mortified", "disgraced"]),
    (Pride, English, Base, &["proud", "accomplished", "successful", "achieved", "fulfilled", "confident in myself"]),
    (Pride, English, Strong, &["triumphant", "victorious"]),
    (Love, English, Base, &["love", "loving", "adore", "cherish", "caring", "affection", "affectionate", "tender", "fond of"]),
    (Love, English, Strong, &["beloved", "devoted", "passionate"]),
    (Contempt, English, Base, &["contempt", "disdain", "scorn", "mockery", "ridicule", "look down on"]),
    (Contempt, English, Strong, &["despise", "loathe", "sneer"]),
];

// =============================================================================
// DUTCH TABLE
// =============================================================================

const DUTCH_TABLE: &[Row] = &[
    (Joy, Dutch, Base, &["blij", "vrolijk", "gelukkig", "tevreden", "dankbaar", "fijn", "geweldig", "fantastisch"]),
    (Joy, Dutch, Strong, &["dolblij", "extatisch", "euforisch"]),
    (Sadness, Dutch, Base, &["verdrietig", "treurig", "somber", "eenzaam", "droevig", "huilen", "neerslachtig"]),
    (Sadness, Dutch, Strong, &["kapot", "wanhopig", "depressief", "ontroostbaar"]),
    (Anger, Dutch, Base, &["boos", "kwaad", "geïrriteerd", "gefrustreerd", "chagrijnig", "geergerd"]),
    (Anger, Dutch, Strong, &["woedend", "razend", "witheet"]),
    (Fear, Dutch, Base, &["bang", "angstig", "bezorgd", "nerveus", "ongerust", "gespannen"]),
    (Fear, Dutch, Strong, &["doodsbang", "paniek", "doodsangst"]),
    (Surprise, Dutch, Base, &["verrast", "verbaasd", "onverwacht"]),
    (Surprise, Dutch, Strong, &["geschokt", "sprakeloos", "perplex"]),
    (Disgust, Dutch, Base, &["vies", "walgelijk", "misselijk", "smerig"]),
    (Disgust, Dutch, Strong, &["afschuwelijk", "weerzinwekkend"]),
    (Trust, Dutch, Base, &["vertrouwen", "veilig", "betrouwbaar", "zeker", "geborgen"]),
    (Trust, Dutch, Strong, &["rotsvast"]),
    (Anticipation, Dutch, Base, &["hoopvol", "benieuwd", "verwachtingsvol", "kijk uit naar", "zin in"]),
    (Anticipation, Dutch, Strong, &["popelen", "reikhalzend"]),
    (Shame, Dutch, Base, &["schaamte", "beschaamd", "schuldig", "gegeneerd", "ongemakkelijk"]),
    (Shame, Dutch, Strong, &["vernederd", "diep beschaamd"]),
    (Pride, Dutch, Base, &["trots", "geslaagd", "voldaan"]),
    (Pride, Dutch, Strong, &["apetrots", "zielsgelukkig met mezelf"]),
    (Love, Dutch, Base, &["liefde", "houden van", "hou van", "dierbaar", "lief", "verliefd"]),
    (Love, Dutch, Strong, &["smoorverliefd", "aanbidden"]),
    (Contempt, Dutch, Base, &["minachting", "verachting", "spot", "neerkijken op"]),
    (Contempt, Dutch, Strong, &["verachten", "walgen van"]),
];

// =============================================================================
// INTENSIFIERS
// =============================================================================

const INTENSIFIERS: &[&str] = &[
    "very", "so", "really", "extremely", "incredibly", "absolutely", "totally",
    "utterly", "deeply", "truly", "super",
    "heel", "erg", "zo", "echt", "enorm", "ontzettend", "vreselijk", "super",
];

lazy_static! {
    // Words with optional apostrophe contractions ("won't", "i'll", "m'n")
    static ref RE_TOKEN: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}\p{N}]+)*").unwrap();

    static ref LEXICON: Lexicon = Lexicon::build(&[ENGLISH_TABLE, DUTCH_TABLE]);

    static ref INTENSIFIER_SET: HashSet<&'static str> = INTENSIFIERS.iter().copied().collect();
}

/// One lowercased token with byte offsets into the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Split text into lowercased word tokens
pub fn tokenize(text: &str) -> Vec<Token> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| Token {
            text: m.as_str().to_lowercase().replace('’', "'"),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

#[derive(Debug)]
struct LexiconEntry {
    emotion: Emotion,
    language: Language,
    tokens: Vec<&'static str>,
    weight: f64,
}

/// Immutable keyword index
#[derive(Debug)]
struct Lexicon {
    entries: Vec<LexiconEntry>,
    by_first: HashMap<&'static str, Vec<usize>>,
}

impl Lexicon {
    fn build(tables: &[&[Row]]) -> Self {
        let mut entries = Vec::new();
        let mut by_first: HashMap<&'static str, Vec<usize>> = HashMap::new();

        for table in tables {
            for &(emotion, language, strength, words) in table.iter() {
                for &word in words {
                    let tokens: Vec<&'static str> = word.split_whitespace().collect();
                    let Some(first) = tokens.first().copied() else {
                        continue;
                    };
                    let weight = match (strength, tokens.len()) {
                        (Strength::Strong, _) => LEXICON_WEIGHT_STRONG,
                        (Strength::Base, 1) => LEXICON_WEIGHT_BASE,
                        (Strength::Base, _) => LEXICON_WEIGHT_PHRASE,
                    };
                    by_first.entry(first).or_default().push(entries.len());
                    entries.push(LexiconEntry {
                        emotion,
                        language,
                        tokens,
                        weight,
                    });
                }
            }
        }

        Self { entries, by_first }
    }

    /// Find every entry match whose emotion passes `include`
    fn find_hits<F>(&self, tokens: &[Token], include: F) -> Vec<EmotionHit>
    where
        F: Fn(Emotion) -> bool,
    {
        let mut hits = Vec::new();
        // The same label listed twice in a table must not double count
        let mut seen: HashSet<(Emotion, usize, usize)> = HashSet::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(candidates) = self.by_first.get(token.text.as_str()) else {
                continue;
            };

            for &idx in candidates {
                let entry = &self.entries[idx];
                if !include(entry.emotion) {
                    continue;
                }
                let len = entry.tokens.len();
                if i + len > tokens.len() {
                    continue;
                }
                let matched = entry.tokens.iter()
                    .zip(&tokens[i..i + len])
                    .all(|(want, got)| *want == got.text);
                if !matched || !seen.insert((entry.emotion, i, len)) {
                    continue;
                }

                let boost = if has_intensifier(tokens, i) { INTENSIFIER_BOOST } else { 1.0 };
                hits.push(EmotionHit {
                    emotion: entry.emotion,
                    token_index: i,
                    token_len: len,
                    start: token.start,
                    end: tokens[i + len - 1].end,
                    language: entry.language,
                    weight: entry.weight * boost,
                });
            }
        }

        hits
    }
}

/// Is there an intensifier within reach before token `i`?
fn has_intensifier(tokens: &[Token], i: usize) -> bool {
    let from = i.saturating_sub(INTENSIFIER_REACH);
    tokens[from..i].iter().any(|t| INTENSIFIER_SET.contains(t.text.as_str()))
}

/// Locate lexicon hits for a subset of emotions without scoring them
pub(crate) fn locate_hits<F>(tokens: &[Token], include: F) -> Vec<EmotionHit>
where
    F: Fn(Emotion) -> bool,
{
    LEXICON.find_hits(tokens, include)
}

/// Lexicon-based emotion classifier
#[derive(Debug, Default)]
pub struct EmotionClassifier;

impl EmotionClassifier {
    /// Create new classifier
    pub fn new() -> Self {
        Self
    }

    /// Score text against the 12-emotion lexicon
    pub fn classify(&self, text: &str) -> Vec<EmotionScore> {
        self.classify_detailed(text).scores
    }

    /// Scores plus the individual hits and language counts
    pub fn classify_detailed(&self, text: &str) -> EmotionAnalysis {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return EmotionAnalysis::default();
        }

        let hits = LEXICON.find_hits(&tokens, |_| true);

        let mut raw: HashMap<Emotion, f64> = HashMap::new();
        let mut language_hits = LanguageHits::default();
        for hit in &hits {
            *raw.entry(hit.emotion).or_insert(0.0) += hit.weight;
            match hit.language {
                Language::English => language_hits.english += 1,
                Language::Dutch => language_hits.dutch += 1,
            }
        }

        let token_count = tokens.len() as f64;
        let mut scores: Vec<EmotionScore> = Emotion::ALL.iter()
            .filter_map(|emotion| {
                let score = (raw.get(emotion)? / token_count).min(EMOTION_SCORE_CAP);
                (score > 0.0).then(|| EmotionScore::new(*emotion, score))
            })
            .collect();

        // Stable sort keeps fixed label order for ties
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));

        EmotionAnalysis {
            scores,
            hits,
            token_count: tokens.len(),
            language_hits,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let classifier = EmotionClassifier::new();
        assert!(classifier.classify("").is_empty());
        assert!(classifier.classify("   \n\t ").is_empty());
    }

    #[test]
    fn test_single_keyword() {
        let classifier = EmotionClassifier::new();
        let scores = classifier.classify("Happy");
        assert_eq!(scores, vec![EmotionScore::new(Emotion::Joy, 1.0)]);
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = EmotionClassifier::new();
        assert_eq!(classifier.classify("I am SAD"), classifier.classify("i am sad"));
    }

    #[test]
    fn test_intensifier_boosts_score() {
        let classifier = EmotionClassifier::new();
        let plain = classifier.classify("today i am happy");
        let boosted = classifier.classify("today i'm very happy");
        assert!(boosted[0].score > plain[0].score, "Intensifier should raise the score");
    }

    #[test]
    fn test_phrase_match() {
        let classifier = EmotionClassifier::new();
        let analysis = classifier.classify_detailed("I am looking forward to the weekend");
        let hit = analysis.hits.iter()
            .find(|h| h.emotion == Emotion::Anticipation)
            .expect("phrase should hit");
        assert_eq!(hit.token_len, 2);
    }

    #[test]
    fn test_dutch_keywords() {
        let classifier = EmotionClassifier::new();
        let analysis = classifier.classify_detailed("Ik ben zo blij en trots vandaag");
        let names: Vec<Emotion> = analysis.scores.iter().map(|s| s.name).collect();
        assert!(names.contains(&Emotion::Joy));
        assert!(names.contains(&Emotion::Pride));
        assert_eq!(analysis.language_hits.dutch, 2);
        assert_eq!(analysis.language_hits.english, 0);
    }

    #[test]
    fn test_ordering_desc_then_label_order() {
        let classifier = EmotionClassifier::new();
        // sad and angry tie; sadness precedes anger in label order
        let scores = classifier.classify("sad angry furious");
        assert_eq!(scores[0].name, Emotion::Anger);
        let ties = classifier.classify("sad angry");
        assert_eq!(ties[0].name, Emotion::Sadness);
        assert_eq!(ties[1].name, Emotion::Anger);
    }

    #[test]
    fn test_scores_bounded() {
        let classifier = EmotionClassifier::new();
        for score in classifier.classify("ecstatic ecstatic ecstatic ecstatic") {
            assert!(score.score >= 0.0 && score.score <= EMOTION_SCORE_CAP);
        }
    }

    #[test]
    fn test_tokenize_contractions() {
        let tokens = tokenize("I won’t go, I'll stay");
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["i", "won't", "go", "i'll", "stay"]);
    }

    #[test]
    fn test_determinism() {
        let classifier = EmotionClassifier::new();
        let text = "I love my friends but I'm so worried about tomorrow";
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }
}
