//! Lower a parsed CQL query into a `FlatQuery`
//!
//! Compilation resolves every index against the field catalog, decides
//! whether the query is a search or a relation lookup, lowers the boolean
//! tree (flattening associative operators on the way) and finally fuses the
//! result with the profile's access filter. Failures are all-or-nothing.

use crate::catalog::escape::split_words;
use crate::catalog::{Escaping, FieldCatalog, FieldSpec, FieldType};
use crate::error::{CompileError, Result};
use crate::profile::Profile;
use crate::query::ast::{CqlQuery, Modifier, Node, Relation, SearchClause, SortSpec};
use crate::query::flat::{Bound, FlatQuery, Leaf, LeafValue};
use crate::query::render::render;
use crate::query::token::{BooleanOp, CompareOp};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Slop used by `prox` without a distance modifier
pub const DEFAULT_SLOP: u32 = 1;

static MODIFIER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.\-]*$").expect("modifier name pattern is valid")
});

static DATE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}(-\d{2}(-\d{2})?)?$").expect("date pattern is valid")
});

/// Whether a query searches records or follows relations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Search,
    Relation,
}

impl QueryKind {
    fn expected(&self) -> &'static str {
        match self {
            QueryKind::Search => "search",
            QueryKind::Relation => "relation lookup",
        }
    }
}

/// Resolved sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub descending: bool,
}

/// Compilation result: the fused query plus resolved sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub kind: QueryKind,
    pub query: FlatQuery,
    pub sort: Vec<SortField>,
}

impl CompiledQuery {
    /// Engine query string
    pub fn render(&self) -> String {
        render(&self.query)
    }

    /// Engine sort parameter (`field asc,field desc`), if any keys were given
    pub fn render_sort(&self) -> Option<String> {
        if self.sort.is_empty() {
            return None;
        }
        let keys: Vec<String> = self
            .sort
            .iter()
            .map(|key| {
                let dir = if key.descending { "desc" } else { "asc" };
                format!("{} {}", key.field, dir)
            })
            .collect();
        Some(keys.join(","))
    }
}

/// Compile `query` for `profile` using `catalog`
pub fn compile(query: &CqlQuery, catalog: &FieldCatalog, profile: &Profile) -> Result<CompiledQuery> {
    QueryCompiler::new(catalog).compile(query, profile)
}

/// Query compiler bound to one field catalog
#[derive(Debug, Clone, Copy)]
pub struct QueryCompiler<'a> {
    catalog: &'a FieldCatalog,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    /// Compile, detecting the query kind from the fields it references
    pub fn compile(&self, query: &CqlQuery, profile: &Profile) -> Result<CompiledQuery> {
        let kind = self.kind_of(&query.root)?;
        self.compile_as(query, profile, kind)
    }

    /// Compile as the given kind
    pub fn compile_as(
        &self,
        query: &CqlQuery,
        profile: &Profile,
        kind: QueryKind,
    ) -> Result<CompiledQuery> {
        let user = self.lower(&query.root, kind)?;
        let fused = FlatQuery::and([user, profile.filter_for(kind).clone()]);
        let sort = match &query.sort {
            Some(spec) => self.resolve_sort(spec)?,
            None => Vec::new(),
        };

        let compiled = CompiledQuery {
            kind,
            query: fused,
            sort,
        };
        debug!(
            profile = profile.name(),
            kind = ?kind,
            query = %compiled.render(),
            "compiled query"
        );
        Ok(compiled)
    }

    /// A query is a relation lookup if it references any relation-only field
    pub fn kind_of(&self, root: &Node) -> std::result::Result<QueryKind, CompileError> {
        let mut kind = QueryKind::Search;
        for clause in root.clauses() {
            let spec = self.resolve(clause)?;
            if !spec.usage.allows_search() {
                kind = QueryKind::Relation;
            }
        }
        Ok(kind)
    }

    /// Lower the user query without any profile filter
    pub fn lower(&self, node: &Node, kind: QueryKind) -> std::result::Result<FlatQuery, CompileError> {
        match node {
            Node::Search(clause) => self.lower_clause(clause, kind),
            Node::Boolean {
                op: BooleanOp::Prox,
                modifiers,
                left,
                right,
            } => self.lower_prox(left, right, modifiers, kind),
            Node::Boolean { op, left, right, .. } => {
                let left = self.lower(left, kind)?;
                let right = self.lower(right, kind)?;
                Ok(match op {
                    BooleanOp::Or => FlatQuery::or([left, right]),
                    // CQL NOT is binary and-not
                    BooleanOp::Not => FlatQuery::and([left, FlatQuery::not(right)]),
                    _ => FlatQuery::and([left, right]),
                })
            }
        }
    }

    fn resolve(&self, clause: &SearchClause) -> std::result::Result<&'a FieldSpec, CompileError> {
        self.catalog.resolve(clause.index.as_deref())
    }

    fn index_name<'c>(&self, clause: &'c SearchClause) -> &'c str
    where
        'a: 'c,
    {
        clause.index.as_deref().unwrap_or(self.catalog.default_index())
    }

    fn check_usage(
        &self,
        clause: &SearchClause,
        spec: &FieldSpec,
        kind: QueryKind,
    ) -> std::result::Result<(), CompileError> {
        let allowed = match kind {
            QueryKind::Search => spec.usage.allows_search(),
            QueryKind::Relation => spec.usage.allows_relation(),
        };
        if allowed {
            Ok(())
        } else {
            Err(CompileError::WrongUsage {
                index: self.index_name(clause).to_string(),
                expected: kind.expected(),
            })
        }
    }

    fn lower_clause(
        &self,
        clause: &SearchClause,
        kind: QueryKind,
    ) -> std::result::Result<FlatQuery, CompileError> {
        let spec = self.resolve(clause)?;
        self.check_usage(clause, spec, kind)?;

        let escaping = clause_escaping(spec, &clause.modifiers)?;
        let lowering = ClauseLowering {
            index: self.index_name(clause),
            spec,
            escaping,
        };

        match &clause.relation {
            Relation::Compare(op) => lowering.compare(*op, &clause.term),
            Relation::Named(name) => match name.as_str() {
                "adj" | "exact" => lowering.phrase(&clause.term),
                "any" => Ok(FlatQuery::or(lowering.each_word(&clause.term)?)),
                "all" => Ok(FlatQuery::and(lowering.each_word(&clause.term)?)),
                "within" => lowering.within(&clause.term),
                _ => Err(CompileError::UnsupportedRelation {
                    index: lowering.index.to_string(),
                    relation: name.clone(),
                }),
            },
        }
    }

    fn lower_prox(
        &self,
        left: &Node,
        right: &Node,
        modifiers: &[Modifier],
        kind: QueryKind,
    ) -> std::result::Result<FlatQuery, CompileError> {
        let (Node::Search(left), Node::Search(right)) = (left, right) else {
            return Err(CompileError::InvalidProximity(
                "both operands must be search clauses".to_string(),
            ));
        };

        let spec = self.resolve(left)?;
        let right_spec = self.resolve(right)?;
        self.check_usage(left, spec, kind)?;
        self.check_usage(right, right_spec, kind)?;

        if spec.field != right_spec.field {
            return Err(CompileError::InvalidProximity(format!(
                "operands use different indexes '{}' and '{}'",
                self.index_name(left),
                self.index_name(right)
            )));
        }
        if !spec.is_tokenized() {
            return Err(CompileError::InvalidProximity(format!(
                "index '{}' is not a text index",
                self.index_name(left)
            )));
        }
        for clause in [left, right] {
            if !is_phrase_relation(&clause.relation) {
                return Err(CompileError::InvalidProximity(format!(
                    "relation '{}' cannot be used with prox",
                    clause.relation
                )));
            }
        }

        let slop = proximity_slop(modifiers)?;
        let mut words = split_words(&left.term);
        words.extend(split_words(&right.term));
        if words.is_empty() {
            return Err(CompileError::InvalidProximity("no words to match".to_string()));
        }

        Ok(FlatQuery::Leaf(Leaf {
            field: spec.field.clone(),
            escaping: spec.escaping,
            value: LeafValue::Proximity {
                words: words.join(" "),
                slop,
            },
        }))
    }

    fn resolve_sort(&self, spec: &SortSpec) -> std::result::Result<Vec<SortField>, CompileError> {
        let mut fields = Vec::with_capacity(spec.keys.len());
        for key in &spec.keys {
            let field = self.catalog.lookup(&key.index)?;
            let mut descending = false;
            for modifier in &key.modifiers {
                check_modifier_name(modifier)?;
                match modifier.name.to_lowercase().as_str() {
                    "sort.descending" | "descending" => descending = true,
                    "sort.ascending" | "ascending" => descending = false,
                    _ => warn!(modifier = %modifier, index = %key.index, "ignoring sort modifier"),
                }
            }
            fields.push(SortField {
                field: field.field.clone(),
                descending,
            });
        }
        Ok(fields)
    }
}

fn is_phrase_relation(relation: &Relation) -> bool {
    match relation {
        Relation::Compare(op) => matches!(op, CompareOp::Eq | CompareOp::Exact),
        Relation::Named(name) => name == "adj" || name == "exact",
    }
}

fn check_modifier_name(modifier: &Modifier) -> std::result::Result<(), CompileError> {
    if MODIFIER_NAME.is_match(&modifier.name) {
        Ok(())
    } else {
        Err(CompileError::MalformedModifier {
            modifier: modifier.to_string(),
            reason: "invalid modifier name".to_string(),
        })
    }
}

/// Relation modifiers may switch off wildcard masking; others are ignored
fn clause_escaping(
    spec: &FieldSpec,
    modifiers: &[Modifier],
) -> std::result::Result<Escaping, CompileError> {
    let mut escaping = spec.escaping;
    for modifier in modifiers {
        check_modifier_name(modifier)?;
        match modifier.name.to_lowercase().as_str() {
            "cql.unmasked" | "unmasked" => escaping = Escaping::Literal,
            "cql.masked" | "masked" => escaping = Escaping::Masked,
            _ => debug!(modifier = %modifier, "ignoring relation modifier"),
        }
    }
    Ok(escaping)
}

fn proximity_slop(modifiers: &[Modifier]) -> std::result::Result<u32, CompileError> {
    let mut slop = DEFAULT_SLOP;
    for modifier in modifiers {
        check_modifier_name(modifier)?;
        let name = modifier.name.to_lowercase();
        if name != "distance" && name != "prox.distance" {
            warn!(modifier = %modifier, "ignoring proximity modifier");
            continue;
        }

        let malformed = |reason: &str| CompileError::MalformedModifier {
            modifier: modifier.to_string(),
            reason: reason.to_string(),
        };
        let Some((op, value)) = &modifier.comparison else {
            return Err(malformed("distance requires a value"));
        };
        let distance: u32 = value
            .parse()
            .map_err(|_| malformed("distance must be a non-negative integer"))?;

        slop = match op {
            CompareOp::Eq | CompareOp::Le => distance,
            CompareOp::Lt if distance > 0 => distance - 1,
            CompareOp::Lt => return Err(malformed("distance<0 can never match")),
            _ => return Err(malformed("distance supports only =, < and <=")),
        };
    }
    Ok(slop)
}

/// Per-clause lowering context
struct ClauseLowering<'c> {
    index: &'c str,
    spec: &'c FieldSpec,
    escaping: Escaping,
}

impl ClauseLowering<'_> {
    fn invalid(&self, value: &str, reason: &str) -> CompileError {
        CompileError::InvalidValue {
            index: self.index.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn check_value(&self, value: &str) -> std::result::Result<(), CompileError> {
        if value.trim().is_empty() {
            return Err(self.invalid(value, "empty term"));
        }
        match self.spec.field_type {
            FieldType::Numeric if !value.parse::<f64>().is_ok_and(f64::is_finite) => {
                Err(self.invalid(value, "expected a number"))
            }
            FieldType::Date if !DATE_VALUE.is_match(value) => {
                Err(self.invalid(value, "expected YYYY, YYYY-MM or YYYY-MM-DD"))
            }
            _ => Ok(()),
        }
    }

    fn term(&self, value: &str) -> std::result::Result<FlatQuery, CompileError> {
        self.check_value(value)?;
        Ok(Leaf::term(&self.spec.field, self.escaping, value).into())
    }

    fn compare(&self, op: CompareOp, value: &str) -> std::result::Result<FlatQuery, CompileError> {
        match op {
            CompareOp::Eq => self.equality(value),
            CompareOp::Exact => self.phrase(value),
            CompareOp::Ne => Ok(FlatQuery::not(self.equality(value)?)),
            CompareOp::Lt => self.range(Bound::Unbounded, Bound::Exclusive(self.bound(value)?)),
            CompareOp::Le => self.range(Bound::Unbounded, Bound::Inclusive(self.bound(value)?)),
            CompareOp::Gt => self.range(Bound::Exclusive(self.bound(value)?), Bound::Unbounded),
            CompareOp::Ge => self.range(Bound::Inclusive(self.bound(value)?), Bound::Unbounded),
        }
    }

    /// `=`: one word is a term, several words on a text field are a phrase
    fn equality(&self, value: &str) -> std::result::Result<FlatQuery, CompileError> {
        let words = split_words(value);
        match words.len() {
            0 => Err(self.invalid(value, "empty term")),
            1 => self.term(&words[0]),
            _ if self.spec.is_tokenized() => {
                Ok(Leaf::phrase(&self.spec.field, self.escaping, words.join(" ")).into())
            }
            _ => self.term(value.trim()),
        }
    }

    fn phrase(&self, value: &str) -> std::result::Result<FlatQuery, CompileError> {
        if !self.spec.is_tokenized() {
            return self.term(value.trim());
        }
        let words = split_words(value);
        if words.is_empty() {
            return Err(self.invalid(value, "empty term"));
        }
        Ok(Leaf::phrase(&self.spec.field, self.escaping, words.join(" ")).into())
    }

    fn each_word(&self, value: &str) -> std::result::Result<Vec<FlatQuery>, CompileError> {
        let words = split_words(value);
        if words.is_empty() {
            return Err(self.invalid(value, "empty term"));
        }
        words.iter().map(|word| self.term(word)).collect()
    }

    fn bound(&self, value: &str) -> std::result::Result<String, CompileError> {
        let value = value.trim();
        self.check_value(value)?;
        Ok(value.to_string())
    }

    fn range(&self, lower: Bound, upper: Bound) -> std::result::Result<FlatQuery, CompileError> {
        Ok(Leaf::range(&self.spec.field, Escaping::Literal, lower, upper).into())
    }

    fn within(&self, value: &str) -> std::result::Result<FlatQuery, CompileError> {
        let words = split_words(value);
        let [low, high] = words.as_slice() else {
            return Err(self.invalid(value, "within expects exactly two values"));
        };
        self.range(
            Bound::Inclusive(self.bound(low)?),
            Bound::Inclusive(self.bound(high)?),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldUsage;
    use crate::error::BibqError;
    use crate::query::parser::parse_cql;

    fn catalog() -> FieldCatalog {
        FieldCatalog::default()
    }

    fn compile_str(input: &str) -> Result<CompiledQuery> {
        let query = parse_cql(input)?;
        compile(&query, &catalog(), &Profile::unrestricted())
    }

    fn rendered(input: &str) -> String {
        compile_str(input).unwrap().render()
    }

    fn compile_err(input: &str) -> CompileError {
        match compile_str(input) {
            Err(BibqError::Compile(err)) => err,
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_term_uses_default_index() {
        assert_eq!(rendered("harry"), "term.default:harry AND *:*");
    }

    #[test]
    fn test_and_scenario() {
        let fields = [
            ("cql.serverchoice".to_string(), FieldSpec::text("idx.any")),
            ("title".to_string(), FieldSpec::text("idx.title")),
            ("author".to_string(), FieldSpec::text("idx.author")),
            (
                "rec.collectionidentifier".to_string(),
                FieldSpec::string("idx.coll"),
            ),
        ];
        let catalog =
            FieldCatalog::new("cql.serverchoice", "rec.collectionidentifier", fields).unwrap();
        let query = parse_cql("title=foo and author=bar").unwrap();
        let compiled = compile(&query, &catalog, &Profile::unrestricted()).unwrap();
        assert_eq!(compiled.render(), "idx.title:foo AND idx.author:bar AND *:*");
        assert_eq!(compiled.kind, QueryKind::Search);
    }

    #[test]
    fn test_undefined_field() {
        assert_eq!(
            compile_err("bogus=x"),
            CompileError::UndefinedField("bogus".to_string())
        );
    }

    #[test]
    fn test_flattening_across_nesting() {
        let compiled = compile_str("(a and b) and (c and d)").unwrap();
        match &compiled.query {
            FlatQuery::And(children) => assert_eq!(children.len(), 5),
            other => panic!("expected And, got {:?}", other),
        }
        assert!(compiled.query.is_flat());
    }

    #[test]
    fn test_or_inside_and() {
        assert_eq!(
            rendered("title=a and (title=b or title=c)"),
            "term.title:a AND (term.title:b OR term.title:c) AND *:*"
        );
    }

    #[test]
    fn test_not_is_and_not() {
        assert_eq!(
            rendered("title=a not title=b"),
            "term.title:a AND NOT term.title:b AND *:*"
        );
    }

    #[test]
    fn test_multi_word_equality_is_phrase() {
        assert_eq!(
            rendered("title=\"harry  potter\""),
            "term.title:\"harry potter\" AND *:*"
        );
        assert_eq!(
            rendered("dc.type=\"lyd bog\""),
            "term.type:lyd\\ bog AND *:*"
        );
    }

    #[test]
    fn test_any_all_adj() {
        assert_eq!(
            rendered("title any \"a b\""),
            "(term.title:a OR term.title:b) AND *:*"
        );
        assert_eq!(
            rendered("title all \"a b\""),
            "term.title:a AND term.title:b AND *:*"
        );
        assert_eq!(rendered("title adj \"a b\""), "term.title:\"a b\" AND *:*");
    }

    #[test]
    fn test_not_equal() {
        assert_eq!(rendered("title <> a"), "NOT term.title:a AND *:*");
    }

    #[test]
    fn test_ranges_and_validation() {
        assert_eq!(rendered("year >= 2000"), "term.year:[2000 TO *] AND *:*");
        assert_eq!(rendered("year < 2000"), "term.year:[* TO 2000} AND *:*");
        assert_eq!(
            rendered("year within \"1990 2000\""),
            "term.year:[1990 TO 2000] AND *:*"
        );
        assert!(matches!(
            compile_err("year > abc"),
            CompileError::InvalidValue { ref index, .. } if index == "year"
        ));
        for value in ["NaN", "inf", "infinity"] {
            assert!(matches!(
                compile_err(&format!("year = {}", value)),
                CompileError::InvalidValue { ref reason, .. } if reason == "expected a number"
            ));
        }
        assert!(matches!(
            compile_err("year >= inf"),
            CompileError::InvalidValue { .. }
        ));
        assert!(matches!(
            compile_err("year within 1990"),
            CompileError::InvalidValue { .. }
        ));
        assert!(matches!(
            compile_err("dc.date = 20-1"),
            CompileError::InvalidValue { .. }
        ));
        assert_eq!(
            rendered("dc.date >= 2001-05"),
            "term.date:[2001\\-05 TO *] AND *:*"
        );
    }

    #[test]
    fn test_unsupported_relation() {
        assert_eq!(
            compile_err("title encloses x"),
            CompileError::UnsupportedRelation {
                index: "title".to_string(),
                relation: "encloses".to_string()
            }
        );
    }

    #[test]
    fn test_wildcards_and_unmasked() {
        assert_eq!(rendered("title=harr*"), "term.title:harr* AND *:*");
        assert_eq!(rendered("title=\"harr\\*\""), "term.title:harr\\* AND *:*");
        assert_eq!(
            rendered("title =/cql.unmasked harr*"),
            "term.title:harr\\* AND *:*"
        );
    }

    #[test]
    fn test_relation_kind_detection() {
        let compiled = compile_str("rel.type=hasReview and rec.workid=W1").unwrap();
        assert_eq!(compiled.kind, QueryKind::Relation);

        assert_eq!(
            compile_err("rel.type=hasReview and title=x"),
            CompileError::WrongUsage {
                index: "title".to_string(),
                expected: "relation lookup"
            }
        );
    }

    #[test]
    fn test_forced_kind() {
        let query = parse_cql("rel.type=x").unwrap();
        let catalog = catalog();
        let err = QueryCompiler::new(&catalog)
            .compile_as(&query, &Profile::unrestricted(), QueryKind::Search)
            .unwrap_err();
        assert!(matches!(
            err,
            BibqError::Compile(CompileError::WrongUsage { expected: "search", .. })
        ));
    }

    #[test]
    fn test_proximity() {
        assert_eq!(rendered("title=a prox title=b"), "term.title:\"a b\"~1 AND *:*");
        assert_eq!(
            rendered("title=a prox/distance<=3 title=b"),
            "term.title:\"a b\"~3 AND *:*"
        );
        assert_eq!(
            rendered("title=a prox/distance<3/unit=word title=b"),
            "term.title:\"a b\"~2 AND *:*"
        );
    }

    #[test]
    fn test_proximity_errors() {
        assert!(matches!(
            compile_err("title=a prox author=b"),
            CompileError::InvalidProximity(_)
        ));
        assert!(matches!(
            compile_err("(title=a and title=b) prox title=c"),
            CompileError::InvalidProximity(_)
        ));
        assert!(matches!(
            compile_err("title=a prox/distance>2 title=b"),
            CompileError::MalformedModifier { .. }
        ));
        assert!(matches!(
            compile_err("title=a prox/distance=x title=b"),
            CompileError::MalformedModifier { .. }
        ));
        assert!(matches!(
            compile_err("title=a prox/distance title=b"),
            CompileError::MalformedModifier { .. }
        ));
        assert!(matches!(
            compile_err("dc.type=a prox dc.type=b"),
            CompileError::InvalidProximity(_)
        ));
    }

    #[test]
    fn test_profile_fusion() {
        let catalog = catalog();
        let meta = crate::profile::ProfileMetadata {
            name: "p".to_string(),
            sources: vec![crate::profile::SourceMetadata::searchable("a")],
        };
        let profile = Profile::compile(&meta, &catalog);
        let query = parse_cql("title=x").unwrap();
        let compiled = compile(&query, &catalog, &profile).unwrap();
        assert_eq!(
            compiled.render(),
            "term.title:x AND rec.collectionIdentifier:a"
        );
    }

    #[test]
    fn test_relation_query_uses_relation_filter() {
        let catalog = catalog();
        let meta = crate::profile::ProfileMetadata {
            name: "p".to_string(),
            sources: vec![
                crate::profile::SourceMetadata::searchable("a"),
                crate::profile::SourceMetadata {
                    collection: "b".to_string(),
                    searchable: false,
                    relations: vec!["hasCover".to_string()],
                },
            ],
        };
        let profile = Profile::compile(&meta, &catalog);
        let query = parse_cql("rel.type=hasCover").unwrap();
        let compiled = compile(&query, &catalog, &profile).unwrap();
        assert_eq!(
            compiled.render(),
            "rel.type:hasCover AND (rec.collectionIdentifier:a OR rec.collectionIdentifier:b)"
        );
    }

    #[test]
    fn test_sort_resolution() {
        let compiled = compile_str("harry sortby title/sort.descending year").unwrap();
        assert_eq!(
            compiled.sort,
            vec![
                SortField {
                    field: "term.title".to_string(),
                    descending: true
                },
                SortField {
                    field: "term.year".to_string(),
                    descending: false
                },
            ]
        );
        assert_eq!(
            compiled.render_sort().as_deref(),
            Some("term.title desc,term.year asc")
        );
        assert!(matches!(
            compile_err("harry sortby bogus"),
            CompileError::UndefinedField(_)
        ));
    }

    #[test]
    fn test_search_usage_rejected_for_relation_only_in_search() {
        let fields = [
            ("cql.serverchoice".to_string(), FieldSpec::text("any")),
            (
                "rec.collectionidentifier".to_string(),
                FieldSpec::string("coll"),
            ),
            (
                "link".to_string(),
                FieldSpec::string("link").with_usage(FieldUsage::Relation),
            ),
        ];
        let catalog =
            FieldCatalog::new("cql.serverchoice", "rec.collectionidentifier", fields).unwrap();
        let query = parse_cql("link=x and foo").unwrap();
        let err = compile(&query, &catalog, &Profile::unrestricted()).unwrap_err();
        assert!(matches!(
            err,
            BibqError::Compile(CompileError::WrongUsage { ref index, .. }) if index == "cql.serverchoice"
        ));
    }

    #[test]
    fn test_deterministic() {
        let a = rendered("title=a or (author=b and subject=c) not dc.type=d");
        let b = rendered("title=a or (author=b and subject=c) not dc.type=d");
        assert_eq!(a, b);
    }
}
