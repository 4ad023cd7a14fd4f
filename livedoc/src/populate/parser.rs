use crate::collection::Collection;
use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use crate::populate::{tokenize, Token};

/// One term of a parsed population specification.
///
/// A node without a target collection passes its field through. A node with
/// a target replaces the ids stored in its field by the referenced
/// documents, populated further with the children when there are any.
#[derive(Debug, Clone)]
pub struct PopulationNode {
    key: String,
    target: Option<Collection>,
    children: Option<Vec<PopulationNode>>,
    is_array: bool,
}

impl PopulationNode {
    /// Path of the field the node reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Collection the field's ids refer to.
    pub fn target(&self) -> Option<&Collection> {
        self.target.as_ref()
    }

    pub fn children(&self) -> Option<&[PopulationNode]> {
        self.children.as_deref()
    }

    /// Whether the children were declared with `[ ]`.
    pub fn is_array(&self) -> bool {
        self.is_array
    }
}

/// Parses a population specification.
///
/// `lookup` resolves the collection names written between `<` and `>`. The
/// whole specification is rejected on the first error.
///
/// ```text
/// title,
/// <users>author{ name },
/// <comments>comments[
///     text,
///     <users>author{ name }
/// ]
/// ```
pub fn parse<F>(spec: &str, lookup: F) -> LiveDocResult<Vec<PopulationNode>>
where
    F: Fn(&str) -> Option<Collection>,
{
    let mut parser = Parser {
        tokens: tokenize(spec),
        position: 0,
        lookup,
    };
    let nodes = parser.parse_list(None)?;
    log::debug!("Parsed population specification into {} nodes", nodes.len());
    Ok(nodes)
}

struct Parser<F> {
    tokens: Vec<Token>,
    position: usize,
    lookup: F,
}

impl<F> Parser<F>
where
    F: Fn(&str) -> Option<Collection>,
{
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn parse_list(&mut self, closing: Option<Token>) -> LiveDocResult<Vec<PopulationNode>> {
        let mut nodes = Vec::new();
        loop {
            match self.next() {
                None => {
                    return match closing {
                        None => Ok(nodes),
                        Some(token) => Err(populate_error(&format!(
                            "Population specification ended before the closing {}",
                            token
                        ))),
                    }
                }
                Some(Token::Word(key)) => {
                    let node = self.parse_children(key, None)?;
                    nodes.push(node);
                }
                Some(Token::OpenRef) => {
                    let node = self.parse_reference()?;
                    nodes.push(node);
                }
                Some(token) if Some(&token) == closing.as_ref() => return Ok(nodes),
                Some(token) => {
                    return Err(populate_error(&format!(
                        "Unexpected {} at token {} of population specification",
                        token, self.position
                    )))
                }
            }
        }
    }

    fn parse_reference(&mut self) -> LiveDocResult<PopulationNode> {
        let name = self.expect_word("a collection name after <")?;
        match self.next() {
            Some(Token::CloseRef) => {}
            _ => return Err(populate_error(&format!("Missing > after collection name {}", name))),
        }

        let Some(target) = (self.lookup)(&name) else {
            return Err(populate_error(&format!("Unknown collection {} in population specification", name)));
        };

        let key = self.expect_word(&format!("a field name after <{}>", name))?;
        self.parse_children(key, Some(target))
    }

    fn parse_children(&mut self, key: String, target: Option<Collection>) -> LiveDocResult<PopulationNode> {
        let (children, is_array) = match self.peek() {
            Some(Token::OpenObject) => {
                self.position += 1;
                (Some(self.parse_list(Some(Token::CloseObject))?), false)
            }
            Some(Token::OpenArray) => {
                self.position += 1;
                (Some(self.parse_list(Some(Token::CloseArray))?), true)
            }
            _ => (None, false),
        };

        Ok(PopulationNode {
            key,
            target,
            children,
            is_array,
        })
    }

    fn expect_word(&mut self, expected: &str) -> LiveDocResult<String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word),
            Some(token) => Err(populate_error(&format!("Expected {}, found {}", expected, token))),
            None => Err(populate_error(&format!("Expected {}, found the end", expected))),
        }
    }
}

fn populate_error(message: &str) -> LiveDocError {
    log::error!("{}", message);
    LiveDocError::new(message, ErrorKind::PopulateError)
}
