use crate::errors::LoxError;
use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::object::Object;
use crate::token::Token;

/// Renders an expression tree as a fully-parenthesized prefix
/// S-expression, e.g. `-123 * (45.67)` prints as `(* (- 123) (group 45.67))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self).expect("printing never produces a LoxError")
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> Result<String, LoxError> {
        let mut out = String::from("(");
        out.push_str(name);
        for expr in exprs {
            out.push(' ');
            out.push_str(&expr.accept(self)?);
        }
        out.push(')');
        Ok(out)
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_literal_expr(&mut self, value: &Object) -> Result<String, LoxError> {
        Ok(match value {
            Object::Nil => "nil".to_string(),
            other => other.to_string(),
        })
    }

    fn visit_grouping_expr(&mut self, expression: &Expr) -> Result<String, LoxError> {
        self.parenthesize("group", &[expression])
    }

    fn visit_unary_expr(&mut self, operator: &Token, right: &Expr) -> Result<String, LoxError> {
        self.parenthesize(&operator.lexeme, &[right])
    }

    fn visit_binary_expr(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<String, LoxError> {
        self.parenthesize(&operator.lexeme, &[left, right])
    }

    fn visit_logical_expr(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<String, LoxError> {
        self.parenthesize(&operator.lexeme, &[left, right])
    }

    fn visit_ternary_expr(
        &mut self,
        condition: &Expr,
        _question: &Token,
        then_branch: &Expr,
        else_branch: &Expr,
    ) -> Result<String, LoxError> {
        self.parenthesize("?", &[condition, then_branch, else_branch])
    }

    fn visit_variable_expr(&mut self, _id: NodeId, name: &Token) -> Result<String, LoxError> {
        Ok(name.lexeme.clone())
    }

    fn visit_assign_expr(&mut self, _id: NodeId, name: &Token, value: &Expr) -> Result<String, LoxError> {
        let rendered = value.accept(self)?;
        Ok(format!("(assign {} {})", name.lexeme, rendered))
    }

    fn visit_call_expr(&mut self, callee: &Expr, _paren: &Token, arguments: &[Expr]) -> Result<String, LoxError> {
        let mut exprs = vec![callee];
        exprs.extend(arguments.iter());
        self.parenthesize("call", &exprs)
    }

    fn visit_get_expr(&mut self, object: &Expr, name: &Token) -> Result<String, LoxError> {
        let rendered = object.accept(self)?;
        Ok(format!("(get {} {})", rendered, name.lexeme))
    }

    fn visit_set_expr(&mut self, object: &Expr, name: &Token, value: &Expr) -> Result<String, LoxError> {
        let object_rendered = object.accept(self)?;
        let value_rendered = value.accept(self)?;
        Ok(format!("(set {} {} {})", object_rendered, name.lexeme, value_rendered))
    }

    fn visit_this_expr(&mut self, _id: NodeId, _keyword: &Token) -> Result<String, LoxError> {
        Ok("this".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_type::TokenKind;

    #[test]
    fn prints_unary_and_grouping_with_precedence_made_explicit() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: Token::new(TokenKind::Minus, "-".to_string(), None, 1),
                right: Box::new(Expr::Literal {
                    value: Object::Number(123.0),
                }),
            }),
            operator: Token::new(TokenKind::Star, "*".to_string(), None, 1),
            right: Box::new(Expr::Grouping {
                expression: Box::new(Expr::Literal {
                    value: Object::Number(45.67),
                }),
            }),
        };

        assert_eq!(AstPrinter.print(&expr), "(* (- 123) (group 45.67))");
    }
}
