//! End-to-end splitting of well-formed scripts.

mod common;
use common::*;

use plsql_split_core::resolver::{deduplicate, StatementSpan};
use plsql_split_core::StatementType;

// ===================================================================
// Single statements
// ===================================================================

#[test]
fn simple_select() {
    let statements = split("SELECT * FROM employees;");
    assert_eq!(statements.len(), 1);
    let stmt = &statements[0];
    assert_eq!(stmt.statement_type, StatementType::Select);
    assert_eq!(stmt.content, "SELECT * FROM employees");
    assert_eq!((stmt.start_line, stmt.start_column), (1, 0));
    assert_eq!((stmt.end_line, stmt.end_column), (1, 23));
}

#[test]
fn select_without_terminator() {
    assert_eq!(contents("SELECT 1 FROM dual"), vec!["SELECT 1 FROM dual"]);
}

#[test]
fn anonymous_block_with_nested_dml() {
    let sql = "BEGIN\n  UPDATE employees SET salary = salary * 1.1;\n  COMMIT;\nEND;\n/";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::PlsqlBlock);
    assert_eq!(
        statements[0].content,
        "BEGIN\n  UPDATE employees SET salary = salary * 1.1;\n  COMMIT;\nEND;"
    );
    assert_eq!((statements[0].end_line, statements[0].end_column), (4, 4));
}

#[test]
fn one_line_procedure() {
    let sql = "CREATE OR REPLACE PROCEDURE p IS BEGIN NULL; END;";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::CreateProcedure);
    assert_eq!(statements[0].content, sql);
}

#[test]
fn deeply_nested_procedure_is_one_statement() {
    let sql = "\
CREATE OR REPLACE PROCEDURE outer_proc IS
  v_count NUMBER;
BEGIN
  DECLARE
    v_inner NUMBER := 0;
  BEGIN
    BEGIN
      SELECT COUNT(*) INTO v_count FROM employees;
    EXCEPTION
      WHEN OTHERS THEN
        ROLLBACK;
    END;
  END;
END outer_proc;
/";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::CreateProcedure);
    assert_eq!((statements[0].start_line, statements[0].end_line), (1, 14));
}

#[test]
fn duplicate_spans_collapse_to_typed_record() {
    let span = |statement_type| StatementSpan {
        content: String::from("SELECT * FROM t"),
        start_line: 1,
        start_column: 0,
        end_line: 1,
        end_column: 15,
        statement_type,
    };
    let merged = deduplicate(vec![span(StatementType::Unknown), span(StatementType::Select)]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].statement_type, StatementType::Select);
}

// ===================================================================
// Multi-statement scripts
// ===================================================================

#[test]
fn multiple_statements() {
    let sql = "\
SELECT * FROM employees;
DELETE FROM employees WHERE id = 1;
INSERT INTO employees (id, name) VALUES (1, 'John');
";
    assert_eq!(
        types(sql),
        vec![
            StatementType::Select,
            StatementType::Delete,
            StatementType::Insert
        ]
    );
    let statements = split(sql);
    assert_eq!(statements[1].start_line, 2);
    assert_eq!(statements[2].content, "INSERT INTO employees (id, name) VALUES (1, 'John')");
}

#[test]
fn comments_between_statements() {
    let sql = "\
-- This is a select statement
SELECT * FROM employees; -- End of statement

/* This is a multi-line comment
   with multiple lines */
DELETE FROM employees WHERE id = 1;
";
    let statements = split(sql);
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].start_line, 2);
    assert_eq!(statements[1].start_line, 6);
    assert_eq!(statements[1].content, "DELETE FROM employees WHERE id = 1");
}

#[test]
fn comments_inside_statement_are_kept() {
    let sql = "SELECT id, -- the key\n       name\nFROM employees;";
    assert_eq!(
        contents(sql),
        vec!["SELECT id, -- the key\n       name\nFROM employees"]
    );
}

#[test]
fn every_statement_family() {
    let sql = "
-- Simple DML statements
SELECT * FROM employees;
INSERT INTO employees (id, name) VALUES (1, 'John');
UPDATE employees SET salary = 1000 WHERE id = 1;
DELETE FROM employees WHERE id = 2;
MERGE INTO employees USING temp_employees ON (employees.id = temp_employees.id);

-- DDL statements
CREATE TABLE customers (id NUMBER, name VARCHAR2(100));
ALTER TABLE customers ADD email VARCHAR2(100);
DROP TABLE old_customers;
TRUNCATE TABLE empty_table;
GRANT SELECT ON employees TO hr_user;
REVOKE DELETE ON employees FROM hr_user;

-- Transaction statements
COMMIT;
ROLLBACK;
SAVEPOINT sp1;
SET TRANSACTION READ ONLY;

-- PL/SQL blocks
BEGIN
  DBMS_OUTPUT.PUT_LINE('Hello, World!');
END;
/

CREATE OR REPLACE PROCEDURE hello_world IS
BEGIN
  DBMS_OUTPUT.PUT_LINE('Hello, World!');
END;
/
";
    let statements = split(sql);
    let found: Vec<StatementType> = statements.iter().map(|s| s.statement_type).collect();
    assert_eq!(
        found,
        vec![
            StatementType::Select,
            StatementType::Insert,
            StatementType::Update,
            StatementType::Delete,
            StatementType::Merge,
            StatementType::CreateTable,
            StatementType::AlterTable,
            StatementType::DropTable,
            StatementType::Truncate,
            StatementType::Grant,
            StatementType::Revoke,
            StatementType::Commit,
            StatementType::Rollback,
            StatementType::Savepoint,
            StatementType::Transaction,
            StatementType::PlsqlBlock,
            StatementType::CreateProcedure,
        ]
    );
    assert_ordered_and_disjoint(&statements);
    assert!(found[..5].iter().all(StatementType::is_dml));
    assert!(found[5..11].iter().all(StatementType::is_ddl));
    assert!(found[11..15].iter().all(StatementType::is_transactional));
    assert!(found[15..].iter().all(StatementType::is_plsql));
}

#[test]
fn slash_separated_units() {
    let sql = "\
CREATE OR REPLACE FUNCTION add_one(p NUMBER) RETURN NUMBER IS
BEGIN
  RETURN p + 1;
END add_one;
/
CREATE OR REPLACE TRIGGER trg_emp
BEFORE INSERT ON employees
FOR EACH ROW
BEGIN
  :NEW.id := emp_seq.NEXTVAL;
END;
/
DECLARE
  v NUMBER;
BEGIN
  v := add_one(1);
END;
/
";
    assert_eq!(
        types(sql),
        vec![
            StatementType::CreateFunction,
            StatementType::CreateTrigger,
            StatementType::PlsqlBlock
        ]
    );
}

// ===================================================================
// Packages and types
// ===================================================================

#[test]
fn package_spec() {
    let sql = "\
CREATE OR REPLACE PACKAGE employee_pkg IS
  -- Package constants
  c_default_dept CONSTANT NUMBER := 10;

  -- Function to get employee name
  FUNCTION get_employee_name(p_emp_id IN NUMBER) RETURN VARCHAR2;

  -- Procedure to update employee
  PROCEDURE update_employee(
    p_emp_id IN NUMBER,
    p_name IN VARCHAR2,
    p_dept_id IN NUMBER DEFAULT c_default_dept
  );
END employee_pkg;
/
";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::CreatePackage);
    assert!(statements[0].content.ends_with("END employee_pkg;"));
}

#[test]
fn package_body() {
    let sql = "\
CREATE OR REPLACE PACKAGE BODY employee_pkg IS
  -- Private variable
  v_last_updated DATE;

  -- Function implementation
  FUNCTION get_employee_name(p_emp_id IN NUMBER) RETURN VARCHAR2 IS
    v_name VARCHAR2(100);
  BEGIN
    SELECT name INTO v_name
    FROM employees
    WHERE id = p_emp_id;

    RETURN v_name;
  EXCEPTION
    WHEN NO_DATA_FOUND THEN
      RETURN NULL;
  END get_employee_name;

  -- Procedure implementation
  PROCEDURE update_employee(
    p_emp_id IN NUMBER,
    p_name IN VARCHAR2,
    p_dept_id IN NUMBER DEFAULT c_default_dept
  ) IS
  BEGIN
    UPDATE employees
    SET name = p_name,
      department_id = p_dept_id
    WHERE id = p_emp_id;

    v_last_updated := SYSDATE;
    COMMIT;
  EXCEPTION
    WHEN OTHERS THEN
      ROLLBACK;
      RAISE;
  END update_employee;

  -- Initialize
BEGIN
  v_last_updated := SYSDATE;
END employee_pkg;
/
";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::CreatePackageBody);
    assert_eq!((statements[0].start_line, statements[0].end_line), (1, 42));
}

#[test]
fn package_spec_followed_by_body() {
    let sql = "\
CREATE PACKAGE pkg AS
  PROCEDURE run;
END pkg;
/
CREATE PACKAGE BODY pkg AS
  PROCEDURE run IS
  BEGIN
    NULL;
  END run;
END pkg;
/
";
    assert_eq!(
        types(sql),
        vec![StatementType::CreatePackage, StatementType::CreatePackageBody]
    );
}

#[test]
fn object_type_and_body() {
    let sql = "\
CREATE OR REPLACE TYPE point_t AS OBJECT (
  x NUMBER,
  y NUMBER,
  MEMBER FUNCTION norm RETURN NUMBER
);
/
CREATE OR REPLACE TYPE BODY point_t AS
  MEMBER FUNCTION norm RETURN NUMBER IS
  BEGIN
    RETURN SQRT(x * x + y * y);
  END;
END;
/
";
    assert_eq!(
        types(sql),
        vec![StatementType::CreateType, StatementType::CreateTypeBody]
    );
}

// ===================================================================
// Nested blocks
// ===================================================================

#[test]
fn nested_blocks_with_exception_handler() {
    let sql = "\
BEGIN
  FOR r_emp IN (SELECT * FROM employees) LOOP
    BEGIN
      UPDATE departments
      SET employee_count = employee_count + 1
      WHERE id = r_emp.department_id;
    EXCEPTION
      WHEN NO_DATA_FOUND THEN
        INSERT INTO departments (id, name, employee_count)
        VALUES (r_emp.department_id, 'New Department', 1);
    END;
  END LOOP;
  COMMIT;
END;
/
";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::PlsqlBlock);
    assert_eq!((statements[0].start_line, statements[0].end_line), (1, 14));
}

#[test]
fn control_structures_stay_inside_block() {
    let sql = "\
DECLARE
  v_total NUMBER := 0;
BEGIN
  <<outer>>
  FOR i IN 1..10 LOOP
    IF MOD(i, 2) = 0 THEN
      v_total := v_total + i;
    ELSIF i = 5 THEN
      CONTINUE;
    ELSE
      NULL;
    END IF;
  END LOOP outer;
  CASE v_total
    WHEN 30 THEN DBMS_OUTPUT.PUT_LINE('thirty');
    ELSE DBMS_OUTPUT.PUT_LINE('other');
  END CASE;
  WHILE v_total > 0 LOOP
    v_total := v_total - 1;
  END LOOP;
END;
SELECT 1 FROM dual;
";
    assert_eq!(
        types(sql),
        vec![StatementType::PlsqlBlock, StatementType::Select]
    );
}

// ===================================================================
// Client commands and miscellany
// ===================================================================

#[test]
fn sqlplus_commands() {
    let sql = "SET SERVEROUTPUT ON\nEXEC refresh_stats;\nSHOW ERRORS\nDESC employees\n";
    assert_eq!(
        types(sql),
        vec![
            StatementType::Unknown,
            StatementType::Execute,
            StatementType::Show,
            StatementType::Describe
        ]
    );
}

#[test]
fn misc_statements() {
    let sql = "\
COMMENT ON TABLE employees IS 'Staff';
LOCK TABLE employees IN EXCLUSIVE MODE;
EXPLAIN PLAN FOR SELECT * FROM employees;
CREATE SEQUENCE emp_seq START WITH 1;
CREATE INDEX emp_name_ix ON employees (name);
CREATE VIEW v_emp AS SELECT * FROM employees;
DROP VIEW v_emp;
ALTER SESSION SET NLS_DATE_FORMAT = 'YYYY-MM-DD';
";
    assert_eq!(
        types(sql),
        vec![
            StatementType::Comment,
            StatementType::LockTable,
            StatementType::ExplainPlan,
            StatementType::CreateSequence,
            StatementType::CreateIndex,
            StatementType::CreateView,
            StatementType::DropView,
            StatementType::Alter,
        ]
    );
}

#[test]
fn with_query_keeps_unknown_type() {
    let sql = "WITH t AS (SELECT 1 AS x FROM dual) SELECT x FROM t;";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].statement_type, StatementType::Unknown);
}

#[test]
fn inline_plsql_in_with_clause() {
    let sql = "\
WITH
  FUNCTION double_it(n NUMBER) RETURN NUMBER IS
  BEGIN
    RETURN n * 2;
  END;
SELECT double_it(salary) FROM employees
/
";
    let statements = split(sql);
    assert_eq!(statements.len(), 1);
    assert_eq!((statements[0].start_line, statements[0].end_line), (1, 6));
}

#[test]
fn from_inside_string_functions() {
    let sql = "\
SELECT TRIM(LEADING '0' FROM '00123') FROM dual;
SELECT TRIM(BOTH 'x' FROM 'xax'), EXTRACT(YEAR FROM hire_date) FROM employees;
";
    assert_eq!(types(sql), vec![StatementType::Select, StatementType::Select]);
    assert_eq!(
        contents(sql)[0],
        "SELECT TRIM(LEADING '0' FROM '00123') FROM dual"
    );
}

#[test]
fn queries_continued_on_new_lines() {
    let sql = "\
SELECT id FROM employees
UNION ALL
SELECT id FROM contractors;
INSERT INTO archive
SELECT * FROM orders;
WITH recent AS (SELECT * FROM orders)
SELECT * FROM recent;
";
    assert_eq!(
        types(sql),
        vec![StatementType::Select, StatementType::Insert, StatementType::Unknown]
    );
}

#[test]
fn multibyte_text_positions() {
    let statements = split("SELECT 'Zoë' FROM dual;\nCOMMIT;");
    assert_eq!(statements[0].end_column, 22);
    assert_eq!(statements[0].content, "SELECT 'Zoë' FROM dual");
    assert_eq!((statements[1].start_line, statements[1].start_column), (2, 0));
}

#[test]
fn blank_and_comment_only_scripts() {
    assert!(split("").is_empty());
    assert!(split("\n\n   \t").is_empty());
    assert!(split("-- just a comment\n/* and another */\n").is_empty());
}
