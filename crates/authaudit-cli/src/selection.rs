use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "selection.pest"]
struct FieldSetParser;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("syntax error: {0}")]
    Syntax(String),
}

/// Parsed field set of a field dependency or a context-forwarding argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    pub context: Option<String>,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Field {
        name: String,
        selections: Vec<Selection>,
    },
    InlineFragment {
        type_condition: String,
        selections: Vec<Selection>,
    },
}

impl Selection {
    pub fn field(name: impl Into<String>) -> Self {
        Selection::Field {
            name: name.into(),
            selections: Vec::new(),
        }
    }
}

pub fn parse_field_set(input: &str) -> Result<FieldSet, SelectionError> {
    let pairs = FieldSetParser::parse(Rule::field_set, input)
        .map_err(|e| SelectionError::Syntax(e.to_string()))?;

    let mut context = None;
    let mut selections = Vec::new();

    for pair in pairs {
        if pair.as_rule() != Rule::field_set {
            continue;
        }
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::context_ref => {
                    let name = inner
                        .into_inner()
                        .next()
                        .ok_or_else(|| missing_token("context name"))?;
                    context = Some(name.as_str().to_string());
                }
                Rule::selection_set => selections.extend(parse_selection_set(inner)?),
                Rule::field | Rule::inline_fragment => selections.push(parse_selection(inner)?),
                _ => {}
            }
        }
    }

    Ok(FieldSet {
        context,
        selections,
    })
}

fn missing_token(context: &str) -> SelectionError {
    SelectionError::Syntax(format!("missing token: {context}"))
}

fn parse_selection_set(
    pair: pest::iterators::Pair<'_, Rule>,
) -> Result<Vec<Selection>, SelectionError> {
    pair.into_inner().map(parse_selection).collect()
}

fn parse_selection(pair: pest::iterators::Pair<'_, Rule>) -> Result<Selection, SelectionError> {
    match pair.as_rule() {
        Rule::field => {
            let mut name = None;
            let mut selections = Vec::new();
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::name => name = Some(inner.as_str().to_string()),
                    Rule::selection_set => selections = parse_selection_set(inner)?,
                    _ => {}
                }
            }
            Ok(Selection::Field {
                name: name.ok_or_else(|| missing_token("field name"))?,
                selections,
            })
        }
        Rule::inline_fragment => {
            let mut inner = pair.into_inner();
            let type_condition = inner
                .next()
                .ok_or_else(|| missing_token("type condition"))?
                .as_str()
                .to_string();
            let selection_set = inner
                .next()
                .ok_or_else(|| missing_token("fragment selection set"))?;
            Ok(Selection::InlineFragment {
                type_condition,
                selections: parse_selection_set(selection_set)?,
            })
        }
        rule => Err(SelectionError::Syntax(format!("unexpected rule: {rule:?}"))),
    }
}
