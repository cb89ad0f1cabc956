//! Refactor Module
//!
//! Edit computation for the two "classic module to ES module" actions. The
//! source is parsed with Oxc; text changes are byte spans into it. Wiring the
//! actions into the editor is the host's job.

use crate::delimited::TextSpan;
use crate::error::RefactorError;
use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression, FunctionBody, Program, Statement};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════════════
// ACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

pub const REFACTOR_NAME: &str = "odooRefactor";
pub const REFACTOR_DESCRIPTION: &str = "Odoo Refactor Actions";

pub const INLINE_ACTION: &str = "classicToEs6Inline";
pub const INLINE_DESCRIPTION: &str = "Refactor classic module to ES6 module inline";

pub const NEWFILE_ACTION: &str = "classicToEs6";
pub const NEWFILE_DESCRIPTION: &str = "Refactor classic module to ES6 module in new file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorAction {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableRefactor {
    pub name: String,
    pub description: String,
    pub actions: Vec<RefactorAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub span: TextSpan,
    pub new_text: String,
}

impl TextChange {
    fn insert(pos: usize, new_text: String) -> Self {
        Self {
            span: TextSpan::new(pos, 0),
            new_text,
        }
    }

    fn delete(start: usize, end: usize) -> Self {
        Self {
            span: TextSpan::new(start, end - start),
            new_text: String::new(),
        }
    }

    fn replace(span: Span, new_text: String) -> Self {
        Self {
            span: to_span(span),
            new_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTextChanges {
    pub file_name: String,
    pub text_changes: Vec<TextChange>,
    pub is_new_file: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorEdits {
    pub edits: Vec<FileTextChanges>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Refactors offered for a cursor at `start` (or a selection ending at `end`).
/// Only `odoo.define(...)` statements at the top level qualify.
pub fn applicable_refactors(
    file_name: &str,
    source: &str,
    start: usize,
    end: Option<usize>,
) -> Option<ApplicableRefactor> {
    let allocator = Allocator::default();
    let program = match parse_program(&allocator, source, file_name) {
        Ok(program) => program,
        Err(e) => {
            debug!(target: "odoo", file = file_name, error = %e, "no refactors for unparsable file");
            return None;
        }
    };

    let stmt = statement_for(&program, start, end)?;
    define_call(stmt)?;

    let action = if program.body.len() == 1 {
        RefactorAction {
            name: INLINE_ACTION.to_string(),
            description: INLINE_DESCRIPTION.to_string(),
        }
    } else {
        RefactorAction {
            name: NEWFILE_ACTION.to_string(),
            description: NEWFILE_DESCRIPTION.to_string(),
        }
    };

    Some(ApplicableRefactor {
        name: REFACTOR_NAME.to_string(),
        description: REFACTOR_DESCRIPTION.to_string(),
        actions: vec![action],
    })
}

pub fn edits_for_refactor(
    file_name: &str,
    source: &str,
    start: usize,
    end: Option<usize>,
    action: &str,
) -> Result<RefactorEdits, RefactorError> {
    let allocator = Allocator::default();
    let program = parse_program(&allocator, source, file_name)?;
    let stmt = statement_for(&program, start, end).ok_or(RefactorError::NoStatement)?;

    match action {
        INLINE_ACTION => {
            let (alias, body_changes) = module_changes(source, stmt)?;
            let mut text_changes = vec![TextChange::insert(0, pragma_header(&alias))];
            text_changes.extend(body_changes);
            Ok(RefactorEdits {
                edits: vec![FileTextChanges {
                    file_name: file_name.to_string(),
                    text_changes,
                    is_new_file: false,
                }],
            })
        }
        NEWFILE_ACTION => {
            let (alias, body_changes) = module_changes(source, stmt)?;
            let span = stmt.span();
            let (stmt_start, stmt_end) = (span.start as usize, span.end as usize);

            let rebased = body_changes
                .into_iter()
                .map(|change| TextChange {
                    span: TextSpan::new(change.span.start - stmt_start, change.span.length),
                    new_text: change.new_text,
                })
                .collect();
            let mut content = pragma_header(&alias);
            content.push_str(&apply_text_changes(&source[stmt_start..stmt_end], rebased));

            Ok(RefactorEdits {
                edits: vec![
                    FileTextChanges {
                        file_name: file_name.to_string(),
                        text_changes: vec![TextChange::delete(stmt_start, stmt_end)],
                        is_new_file: false,
                    },
                    FileTextChanges {
                        file_name: sibling_file_name(file_name, &alias),
                        text_changes: vec![TextChange::insert(0, content)],
                        is_new_file: true,
                    },
                ],
            })
        }
        other => Err(RefactorError::UnknownAction(other.to_string())),
    }
}

/// Apply non-overlapping changes to `text`.
pub fn apply_text_changes(text: &str, mut changes: Vec<TextChange>) -> String {
    // Back to front; at equal offsets the wider change goes first so an
    // insertion is not swallowed by a deletion starting at the same point.
    changes.sort_by(|a, b| {
        b.span
            .start
            .cmp(&a.span.start)
            .then(b.span.length.cmp(&a.span.length))
    });
    let mut out = text.to_string();
    for change in changes {
        out.replace_range(change.span.start..change.span.end(), &change.new_text);
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// INTERNALS
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_program<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    file_name: &str,
) -> Result<Program<'a>, RefactorError> {
    let source_type = SourceType::default().with_module(true);
    let ret = Parser::new(allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(RefactorError::Parse(file_name.to_string()));
    }
    Ok(ret.program)
}

fn to_span(span: Span) -> TextSpan {
    TextSpan::new(span.start as usize, (span.end - span.start) as usize)
}

fn text_of(source: &str, span: Span) -> &str {
    &source[span.start as usize..span.end as usize]
}

fn pragma_header(alias: &str) -> String {
    format!("/** @odoo-module alias={alias} */\n")
}

fn sibling_file_name(file_name: &str, alias: &str) -> String {
    Path::new(file_name)
        .with_file_name(format!("{alias}.js"))
        .to_string_lossy()
        .to_string()
}

fn find_top_level_statement<'p, 'a>(program: &'p Program<'a>, pos: usize) -> Option<&'p Statement<'a>> {
    program.body.iter().find(|stmt| {
        let span = stmt.span();
        pos >= span.start as usize && pos < span.end as usize
    })
}

fn statement_for<'p, 'a>(
    program: &'p Program<'a>,
    start: usize,
    end: Option<usize>,
) -> Option<&'p Statement<'a>> {
    find_top_level_statement(program, start)
        .or_else(|| end.and_then(|end| find_top_level_statement(program, end)))
}

/// The `odoo.define(...)` call of an expression statement.
fn define_call<'p, 'a>(stmt: &'p Statement<'a>) -> Option<&'p CallExpression<'a>> {
    let Statement::ExpressionStatement(expr_stmt) = stmt else {
        return None;
    };
    let Expression::CallExpression(call) = &expr_stmt.expression else {
        return None;
    };
    let Expression::StaticMemberExpression(member) = &call.callee else {
        return None;
    };
    let Expression::Identifier(object) = &member.object else {
        return None;
    };
    if object.name == "odoo" && member.property.name == "define" {
        Some(call)
    } else {
        None
    }
}

/// `require("m")` → `m`.
fn require_module(expr: &Expression) -> Option<String> {
    let Expression::CallExpression(call) = expr else {
        return None;
    };
    let Expression::Identifier(callee) = &call.callee else {
        return None;
    };
    if callee.name != "require" {
        return None;
    }
    match call.arguments.first() {
        Some(Argument::StringLiteral(lit)) => Some(lit.value.to_string()),
        _ => None,
    }
}

/// Alias of the module plus the edits that unwrap its factory in place.
fn module_changes(source: &str, stmt: &Statement) -> Result<(String, Vec<TextChange>), RefactorError> {
    let Statement::ExpressionStatement(expr_stmt) = stmt else {
        return Err(RefactorError::Assertion("expected an expression statement"));
    };
    let Expression::CallExpression(call) = &expr_stmt.expression else {
        return Err(RefactorError::Assertion("expected a call expression"));
    };
    if call.arguments.len() != 2 {
        return Err(RefactorError::ArgumentCount);
    }
    let Some(Argument::StringLiteral(module)) = call.arguments.first() else {
        return Err(RefactorError::Assertion("module name must be a string literal"));
    };
    let alias = module.value.to_string();
    let stmt_span = stmt.span();

    let mut changes = Vec::new();
    match call.arguments.get(1) {
        Some(Argument::FunctionExpression(func)) => {
            let body = func
                .body
                .as_ref()
                .ok_or(RefactorError::Assertion("factory has no body"))?;
            block_changes(source, stmt_span, body, &mut changes);
        }
        Some(Argument::ArrowFunctionExpression(arrow)) if arrow.expression => {
            let Some(Statement::ExpressionStatement(body)) = arrow.body.statements.first() else {
                return Err(RefactorError::Assertion("arrow factory has no expression"));
            };
            changes.push(TextChange::replace(
                stmt_span,
                format!("export default {};", text_of(source, body.expression.span())),
            ));
        }
        Some(Argument::ArrowFunctionExpression(arrow)) => {
            block_changes(source, stmt_span, &arrow.body, &mut changes);
        }
        _ => {
            return Err(RefactorError::Assertion(
                "factory must be a function or arrow function",
            ))
        }
    }

    Ok((alias, changes))
}

fn block_changes(source: &str, stmt_span: Span, body: &FunctionBody, changes: &mut Vec<TextChange>) {
    for stmt in &body.statements {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                // var, let or const
                let start = decl.span.start as usize;
                let keyword_len = source[start..]
                    .bytes()
                    .take_while(u8::is_ascii_alphabetic)
                    .count();
                changes.push(TextChange::delete(start, start + keyword_len));

                let count = decl.declarations.len();
                for (i, declarator) in decl.declarations.iter().enumerate() {
                    let Some(required) = declarator.init.as_ref().and_then(require_module) else {
                        continue;
                    };
                    let name = text_of(source, declarator.id.span());
                    let mut change = TextChange::replace(
                        declarator.span,
                        format!("import {name} from \"{required}\""),
                    );
                    // Declarators are joined by a single-character comma.
                    if i + 1 != count {
                        change.span.length += 1;
                        change.new_text.push(';');
                    }
                    changes.push(change);
                }
            }
            Statement::ExpressionStatement(expr_stmt) => {
                if let Some(required) = require_module(&expr_stmt.expression) {
                    changes.push(TextChange::replace(
                        expr_stmt.span,
                        format!("import \"{required}\";"),
                    ));
                }
            }
            Statement::ReturnStatement(ret) => {
                if let Some(argument) = &ret.argument {
                    changes.push(TextChange::replace(
                        ret.span,
                        format!("export default {};", text_of(source, argument.span())),
                    ));
                }
            }
            _ => {}
        }
    }

    // The body begins and ends with brace tokens.
    changes.push(TextChange::delete(
        stmt_span.start as usize,
        body.span.start as usize + 1,
    ));
    changes.push(TextChange::delete(
        body.span.end as usize - 1,
        stmt_span.end as usize,
    ));
}
