//! Diagnostic message catalog.
//!
//! Codes follow the TypeScript numbering so diagnostics line up with
//! existing tooling. Each entry produces a `diagnostic_codes` constant, a
//! `diagnostic_messages` constant, and a row in `DIAGNOSTIC_MESSAGES`.

use super::{DiagnosticCategory, DiagnosticMessage};

macro_rules! diagnostic_catalog {
    ($($name:ident = $code:literal, $category:ident, $message:literal;)*) => {
        pub mod diagnostic_codes {
            $(pub const $name: u32 = $code;)*
        }

        pub mod diagnostic_messages {
            $(pub const $name: &str = $message;)*
        }

        pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
            $(DiagnosticMessage {
                code: $code,
                category: DiagnosticCategory::$category,
                message: $message,
            },)*
        ];
    };
}

diagnostic_catalog! {
    // Statements
    RETURN_STATEMENT_OUTSIDE_FUNCTION = 1108, Error,
        "A 'return' statement can only be used within a function body.";

    // Declarations and binding
    DUPLICATE_IDENTIFIER = 2300, Error, "Duplicate identifier '{0}'.";
    CIRCULAR_IMPORT_ALIAS = 2303, Error, "Circular definition of import alias '{0}'.";
    CANNOT_FIND_NAME = 2304, Error, "Cannot find name '{0}'.";
    MODULE_HAS_NO_EXPORTED_MEMBER = 2305, Error, "Module '{0}' has no exported member '{1}'.";
    TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE = 2310, Error,
        "Type '{0}' recursively references itself as a base type.";
    CLASS_MAY_ONLY_EXTEND_CLASS = 2311, Error, "A class may only extend another class.";
    INTERFACE_MAY_ONLY_EXTEND_CLASS_OR_INTERFACE = 2312, Error,
        "An interface may only extend a class or another interface.";
    GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS = 2314, Error,
        "Generic type '{0}' requires {1} type argument(s).";
    TYPE_IS_NOT_GENERIC = 2315, Error, "Type '{0}' is not generic.";
    TYPE_IS_NOT_ASSIGNABLE_TO_TYPE = 2322, Error,
        "Type '{0}' is not assignable to type '{1}'.";
    THIS_IN_MODULE_BODY = 2331, Error,
        "'this' cannot be referenced in a module or namespace body.";
    THIS_IN_CURRENT_LOCATION = 2332, Error, "'this' cannot be referenced in current location.";
    THIS_IN_CONSTRUCTOR_ARGUMENTS = 2333, Error,
        "'this' cannot be referenced in constructor arguments.";
    THIS_IN_STATIC_PROPERTY_INITIALIZER = 2334, Error,
        "'this' cannot be referenced in a static property initializer.";
    SUPER_ONLY_IN_DERIVED_CLASS = 2335, Error,
        "'super' can only be referenced in a derived class.";
    SUPER_CALL_OUTSIDE_CONSTRUCTOR = 2337, Error,
        "Super calls are not permitted outside constructors or in nested functions inside constructors.";
    SUPER_PROPERTY_ACCESS_OUTSIDE_MEMBER = 2338, Error,
        "'super' property access is permitted only in a constructor, member function, or member accessor of a derived class.";
    PROPERTY_DOES_NOT_EXIST_ON_TYPE = 2339, Error,
        "Property '{0}' does not exist on type '{1}'.";
    SUPER_ACCESS_ONLY_METHODS = 2340, Error,
        "Only public methods of the base class are accessible via the 'super' keyword.";
    PROPERTY_IS_PRIVATE = 2341, Error,
        "Property '{0}' is private and only accessible within class '{1}'.";
    TYPE_DOES_NOT_SATISFY_CONSTRAINT = 2344, Error,
        "Type '{0}' does not satisfy the constraint '{1}'.";
    ARGUMENT_NOT_ASSIGNABLE_TO_PARAMETER = 2345, Error,
        "Argument of type '{0}' is not assignable to parameter of type '{1}'.";
    SUPPLIED_PARAMETERS_DO_NOT_MATCH = 2346, Error,
        "Supplied parameters do not match any signature of call target.";
    EXPRESSION_NOT_CALLABLE = 2349, Error,
        "Cannot invoke an expression whose type lacks a call signature.";
    EXPRESSION_NOT_CONSTRUCTABLE = 2351, Error,
        "Cannot use 'new' with an expression whose type lacks a call or construct signature.";
    CANNOT_CONVERT_TYPE = 2352, Error, "Cannot convert type '{0}' to type '{1}'.";
    FUNCTION_MUST_RETURN_VALUE = 2355, Error,
        "A function whose declared type is neither 'void' nor 'any' must return a value.";
    ARITHMETIC_OPERAND_MUST_BE_NUMBER = 2356, Error,
        "An arithmetic operand must be of type 'any', 'number' or an enum type.";
    INCREMENT_OPERAND_MUST_BE_VARIABLE = 2357, Error,
        "The operand of an increment or decrement operator must be a variable or a property access.";
    INSTANCEOF_LEFT_OPERAND = 2358, Error,
        "The left-hand side of an 'instanceof' expression must be of type 'any', an object type or a type parameter.";
    INSTANCEOF_RIGHT_OPERAND = 2359, Error,
        "The right-hand side of an 'instanceof' expression must be of type 'any' or of a type assignable to the 'Function' interface type.";
    IN_LEFT_OPERAND = 2360, Error,
        "The left-hand side of an 'in' expression must be of type 'any', 'string' or 'number'.";
    IN_RIGHT_OPERAND = 2361, Error,
        "The right-hand side of an 'in' expression must be of type 'any', an object type or a type parameter.";
    ARITHMETIC_LEFT_OPERAND = 2362, Error,
        "The left-hand side of an arithmetic operation must be of type 'any', 'number' or an enum type.";
    ARITHMETIC_RIGHT_OPERAND = 2363, Error,
        "The right-hand side of an arithmetic operation must be of type 'any', 'number' or an enum type.";
    INVALID_ASSIGNMENT_TARGET = 2364, Error, "Invalid left-hand side of assignment expression.";
    OPERATOR_CANNOT_BE_APPLIED = 2365, Error,
        "Operator '{0}' cannot be applied to types '{1}' and '{2}'.";
    DUPLICATE_INDEX_SIGNATURE = 2374, Error, "Duplicate {0} index signature.";
    SUPER_CALL_MUST_BE_FIRST_STATEMENT = 2376, Error,
        "A 'super' call must be the first statement in the constructor when a class contains initialized properties or has parameter properties.";
    DERIVED_CONSTRUCTOR_MUST_CALL_SUPER = 2377, Error,
        "Constructors for derived classes must contain a 'super' call.";
    GETTER_MUST_RETURN_VALUE = 2378, Error, "A 'get' accessor must return a value.";
    ACCESSOR_VISIBILITY_MISMATCH = 2379, Error,
        "Getter and setter accessors do not agree in visibility.";
    ACCESSOR_TYPE_MISMATCH = 2380, Error, "'get' and 'set' accessor must have the same type.";
    OVERLOADS_EXPORTED_MISMATCH = 2383, Error,
        "Overload signatures must all be exported or not exported.";
    OVERLOADS_AMBIENT_MISMATCH = 2384, Error,
        "Overload signatures must all be ambient or non-ambient.";
    OVERLOADS_VISIBILITY_MISMATCH = 2385, Error,
        "Overload signatures must all be public or private.";
    OVERLOADS_OPTIONAL_MISMATCH = 2386, Error,
        "Overload signatures must all be optional or required.";
    FUNCTION_IMPLEMENTATION_MISSING = 2391, Error,
        "Function implementation is missing or not immediately following the declaration.";
    DUPLICATE_FUNCTION_IMPLEMENTATION = 2393, Error, "Duplicate function implementation.";
    OVERLOAD_NOT_COMPATIBLE_WITH_IMPLEMENTATION = 2394, Error,
        "Overload signature is not compatible with function definition.";
    SUBSEQUENT_VARIABLE_DECLARATIONS_TYPE = 2403, Error,
        "Subsequent variable declarations must have the same type. Variable '{0}' must be of type '{1}', but here has type '{2}'.";
    FOR_IN_LEFT_OPERAND = 2405, Error,
        "The left-hand side of a 'for...in' statement must be of type 'string' or 'any'.";
    FOR_IN_RIGHT_OPERAND = 2407, Error,
        "The right-hand side of a 'for...in' statement must be of type 'any', an object type or a type parameter.";
    SETTER_CANNOT_RETURN_VALUE = 2408, Error, "Setters cannot return a value.";
    PROPERTY_NOT_ASSIGNABLE_TO_STRING_INDEX = 2411, Error,
        "Property '{0}' of type '{1}' is not assignable to string index type '{2}'.";
    PROPERTY_NOT_ASSIGNABLE_TO_NUMERIC_INDEX = 2412, Error,
        "Property '{0}' of type '{1}' is not assignable to numeric index type '{2}'.";
    NUMERIC_INDEX_NOT_SUBTYPE_OF_STRING_INDEX = 2413, Error,
        "Numeric index type '{0}' must be a subtype of string index type '{1}'.";
    CLASS_INCORRECTLY_EXTENDS = 2415, Error,
        "Class '{0}' incorrectly extends base class '{1}'.";
    CLASS_INCORRECTLY_IMPLEMENTS = 2420, Error,
        "Class '{0}' incorrectly implements interface '{1}'.";
    CLASS_MAY_ONLY_IMPLEMENT = 2422, Error,
        "A class may only implement another class or interface.";
    CLASS_MEMBER_KIND_MISMATCH = 2425, Error,
        "Class '{0}' defines instance member {1} '{2}', but extended class '{3}' defines it as instance member {4}.";
    TYPE_PARAMETERS_MUST_BE_IDENTICAL = 2428, Error,
        "All declarations of '{0}' must have identical type parameters.";
    INTERFACE_INCORRECTLY_EXTENDS = 2430, Error,
        "Interface '{0}' incorrectly extends interface '{1}'.";
    ENUM_MULTIPLE_FIRST_MEMBERS = 2432, Error,
        "In an enum with multiple declarations, only one declaration can omit an initializer for its first enum element.";
    ENUM_INITIALIZER_MUST_BE_NUMBER = 2553, Error,
        "Enum member initializer must be of type 'number'.";
    STATIC_MEMBER_VIA_INSTANCE = 2576, Error,
        "Property '{0}' is a static member of type '{1}' and cannot be accessed through an instance.";
    ONLY_REFERS_TO_A_TYPE = 2693, Error,
        "'{0}' only refers to a type, but is being used as a value here.";
    MODULE_USED_AS_VALUE = 2708, Error,
        "Cannot use module '{0}' as a value because it has no instance.";
    VALUE_USED_AS_TYPE = 2749, Error,
        "'{0}' refers to a value, but is being used as a type here.";

    // Privacy of exported declarations
    IMPLEMENTS_CLAUSE_USES_PRIVATE_NAME = 4019, Error,
        "Implements clause of exported class '{0}' has or is using private name '{1}'.";
    EXTENDS_CLAUSE_OF_CLASS_USES_PRIVATE_NAME = 4020, Error,
        "'extends' clause of exported class '{0}' has or is using private name '{1}'.";
    EXTENDS_CLAUSE_OF_INTERFACE_USES_PRIVATE_NAME = 4022, Error,
        "'extends' clause of exported interface '{0}' has or is using private name '{1}'.";
    EXPORTED_VARIABLE_USES_PRIVATE_MODULE = 4024, Error,
        "Exported variable '{0}' has or is using name '{1}' from private module '{2}'.";
    EXPORTED_VARIABLE_USES_PRIVATE_NAME = 4025, Error,
        "Exported variable '{0}' has or is using private name '{1}'.";
    PUBLIC_PROPERTY_USES_PRIVATE_NAME = 4031, Error,
        "Public property '{0}' of exported class has or is using private name '{1}'.";
    INTERFACE_PROPERTY_USES_PRIVATE_NAME = 4033, Error,
        "Property '{0}' of exported interface has or is using private name '{1}'.";
    RETURN_TYPE_USES_PRIVATE_NAME = 4060, Error,
        "Return type of exported function has or is using private name '{0}'.";
    PUBLIC_METHOD_RETURN_TYPE_USES_PRIVATE_NAME = 4055, Error,
        "Return type of public method from exported class has or is using private name '{0}'.";
    PUBLIC_METHOD_PARAMETER_USES_PRIVATE_NAME = 4073, Error,
        "Parameter '{0}' of public method from exported class has or is using private name '{1}'.";
    PARAMETER_USES_PRIVATE_NAME = 4078, Error,
        "Parameter '{0}' of exported function has or is using private name '{1}'.";
    PARAMETER_USES_PRIVATE_MODULE = 4079, Error,
        "Parameter '{0}' of exported function has or is using name '{1}' from private module '{2}'.";
    RETURN_TYPE_USES_PRIVATE_MODULE = 4061, Error,
        "Return type of exported function has or is using name '{0}' from private module '{1}'.";

    // Implicit any
    VARIABLE_IMPLICITLY_HAS_ANY = 7005, Error, "Variable '{0}' implicitly has an '{1}' type.";
    PARAMETER_IMPLICITLY_HAS_ANY = 7006, Error, "Parameter '{0}' implicitly has an '{1}' type.";
    MEMBER_IMPLICITLY_HAS_ANY = 7008, Error, "Member '{0}' implicitly has an '{1}' type.";
    RETURN_TYPE_IMPLICITLY_ANY = 7010, Error,
        "'{0}', which lacks return-type annotation, implicitly has an '{1}' return type.";
}
